//! Mock IR output port.

use crate::{
    HardwareError, Result,
    mock::{Registration, lock},
    traits::IrOutput,
    types::DeviceInfo,
};
use hearth_core::PortIndex;
use std::sync::{Arc, Mutex};

/// A call made on a mock IR port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrCall {
    Press(String),
    Release,
}

#[derive(Debug, Default)]
struct IrState {
    calls: Vec<IrCall>,
    active: Option<String>,
}

/// Mock IR output port.
///
/// Accepts any command name; a port with a loaded command set would reject
/// unknown ones.
#[derive(Debug)]
pub struct MockIrOutput {
    port: PortIndex,
    name: String,
    registration: Registration,
    state: Arc<Mutex<IrState>>,
}

impl MockIrOutput {
    pub fn new(port: PortIndex) -> (Self, MockIrOutputHandle) {
        let state = Arc::new(Mutex::new(IrState::default()));

        let output = Self {
            port,
            name: format!("IR {port}"),
            registration: Registration::default(),
            state: Arc::clone(&state),
        };

        (output, MockIrOutputHandle { state })
    }

    /// Make [`register`](IrOutput::register) fail with `reason`.
    pub fn with_registration_failure(mut self, reason: impl Into<String>) -> Self {
        self.registration = Registration::failing(reason);
        self
    }

    pub fn port(&self) -> PortIndex {
        self.port
    }
}

impl IrOutput for MockIrOutput {
    async fn register(&mut self) -> Result<()> {
        self.registration.register(&self.name)
    }

    async fn press(&mut self, command: &str) -> Result<()> {
        self.registration.ensure(&self.name)?;
        if command.is_empty() {
            return Err(HardwareError::invalid_data("Empty IR command"));
        }
        let mut state = lock(&self.state);
        state.calls.push(IrCall::Press(command.to_string()));
        state.active = Some(command.to_string());
        Ok(())
    }

    async fn release(&mut self) -> Result<()> {
        self.registration.ensure(&self.name)?;
        let mut state = lock(&self.state);
        state.calls.push(IrCall::Release);
        state.active = None;
        Ok(())
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(self.name.clone(), "Mock IR Emitter"))
    }
}

/// Handle for inspecting a mock IR port.
#[derive(Debug, Clone)]
pub struct MockIrOutputHandle {
    state: Arc<Mutex<IrState>>,
}

impl MockIrOutputHandle {
    /// Every press and release, in order.
    pub fn calls(&self) -> Vec<IrCall> {
        lock(&self.state).calls.clone()
    }

    /// Command currently being emitted.
    pub fn active(&self) -> Option<String> {
        lock(&self.state).active.clone()
    }
}
