//! Mock digital output port.

use crate::{
    HardwareError, Result,
    mock::{Registration, lock},
    traits::DigitalOutput,
    types::{DeviceInfo, PortMode},
};
use hearth_core::PortIndex;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct OutputState {
    mode: PortMode,
    level: bool,
    /// Every level written, in order.
    history: Vec<bool>,
}

/// Mock digital output port.
///
/// Levels written through [`DigitalOutput::set_level`] are visible on the
/// paired [`MockDigitalOutputHandle`].
///
/// # Examples
///
/// ```
/// use hearth_core::PortIndex;
/// use hearth_hardware::mock::MockDigitalOutput;
/// use hearth_hardware::traits::DigitalOutput;
/// use hearth_hardware::types::PortMode;
///
/// #[tokio::main]
/// async fn main() -> hearth_hardware::Result<()> {
///     let (mut output, handle) = MockDigitalOutput::new(PortIndex::new(1)?);
///     output.register().await?;
///     output.configure(PortMode::DigitalOutput).await?;
///
///     output.set_level(true).await?;
///     assert!(handle.level());
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockDigitalOutput {
    port: PortIndex,
    name: String,
    registration: Registration,
    state: Arc<Mutex<OutputState>>,
}

impl MockDigitalOutput {
    /// Create a new mock output. The port starts as an input driven low.
    pub fn new(port: PortIndex) -> (Self, MockDigitalOutputHandle) {
        let state = Arc::new(Mutex::new(OutputState::default()));

        let output = Self {
            port,
            name: format!("Versiport {port}"),
            registration: Registration::default(),
            state: Arc::clone(&state),
        };

        (output, MockDigitalOutputHandle { state })
    }

    /// Make [`register`](DigitalOutput::register) fail with `reason`.
    pub fn with_registration_failure(mut self, reason: impl Into<String>) -> Self {
        self.registration = Registration::failing(reason);
        self
    }

    pub fn port(&self) -> PortIndex {
        self.port
    }
}

impl DigitalOutput for MockDigitalOutput {
    async fn register(&mut self) -> Result<()> {
        self.registration.register(&self.name)
    }

    async fn configure(&mut self, mode: PortMode) -> Result<()> {
        self.registration.ensure(&self.name)?;
        lock(&self.state).mode = mode;
        Ok(())
    }

    async fn set_level(&mut self, level: bool) -> Result<()> {
        self.registration.ensure(&self.name)?;
        let mut state = lock(&self.state);
        if state.mode != PortMode::DigitalOutput {
            return Err(HardwareError::unsupported(format!(
                "set_level on {} configured as input",
                self.name
            )));
        }
        state.level = level;
        state.history.push(level);
        Ok(())
    }

    async fn level(&self) -> Result<bool> {
        Ok(lock(&self.state).level)
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(self.name.clone(), "Mock Versiport"))
    }
}

/// Handle for inspecting a mock digital output.
#[derive(Debug, Clone)]
pub struct MockDigitalOutputHandle {
    state: Arc<Mutex<OutputState>>,
}

impl MockDigitalOutputHandle {
    /// Current level.
    pub fn level(&self) -> bool {
        lock(&self.state).level
    }

    /// Current direction.
    pub fn mode(&self) -> PortMode {
        lock(&self.state).mode
    }

    /// Every level written so far.
    pub fn history(&self) -> Vec<bool> {
        lock(&self.state).history.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(n: u8) -> PortIndex {
        PortIndex::new(n).unwrap()
    }

    #[tokio::test]
    async fn test_set_level_records_history() {
        let (mut output, handle) = MockDigitalOutput::new(port(1));
        output.register().await.unwrap();
        output.configure(PortMode::DigitalOutput).await.unwrap();

        output.set_level(true).await.unwrap();
        output.set_level(false).await.unwrap();

        assert!(!handle.level());
        assert_eq!(handle.history(), vec![true, false]);
        assert_eq!(handle.mode(), PortMode::DigitalOutput);
    }

    #[tokio::test]
    async fn test_set_level_on_input_is_unsupported() {
        let (mut output, handle) = MockDigitalOutput::new(port(2));
        output.register().await.unwrap();

        assert!(matches!(
            output.set_level(true).await,
            Err(HardwareError::Unsupported { .. })
        ));
        assert!(handle.history().is_empty());
    }

    #[tokio::test]
    async fn test_configure_before_register() {
        let (mut output, _handle) = MockDigitalOutput::new(port(1));

        assert!(matches!(
            output.configure(PortMode::DigitalOutput).await,
            Err(HardwareError::NotRegistered { .. })
        ));
    }

    #[tokio::test]
    async fn test_registration_failure() {
        let (output, _handle) = MockDigitalOutput::new(port(1));
        let mut output = output.with_registration_failure("Port in use");

        assert!(output.register().await.is_err());
        assert_eq!(output.get_info().await.unwrap().name, "Versiport 1");
    }
}
