//! Mock keypad implementation for testing and development.
//!
//! This module provides a simulated keypad that can be driven
//! programmatically for testing without requiring a physical keypad.

use crate::{
    HardwareError, Result,
    mock::Registration,
    traits::KeypadDevice,
    types::{ButtonEvent, DeviceInfo, KeypadEvent},
};
use hearth_core::{ButtonNumber, DeviceAddress, PortIndex};
use tokio::sync::mpsc;

/// Mock keypad device for testing and development.
///
/// Events are injected through a [`MockKeypadHandle`] and come back out of
/// [`read_event`](KeypadDevice::read_event) in order.
///
/// # Examples
///
/// ```
/// use hearth_hardware::mock::MockKeypad;
/// use hearth_hardware::traits::KeypadDevice;
/// use hearth_hardware::types::{ButtonState, KeypadEvent};
///
/// #[tokio::main]
/// async fn main() -> hearth_hardware::Result<()> {
///     let (mut keypad, handle) = MockKeypad::new();
///     keypad.register().await?;
///
///     handle.press(1).await?;
///
///     match keypad.read_event().await? {
///         KeypadEvent::Button(event) => assert_eq!(event.state, ButtonState::Pressed),
///         other => panic!("unexpected event: {other:?}"),
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockKeypad {
    /// Channel receiver for simulated events
    event_rx: mpsc::Receiver<KeypadEvent>,

    /// Device name
    name: String,

    /// Bus address
    address: DeviceAddress,

    registration: Registration,
}

impl MockKeypad {
    /// Create a new mock keypad at the default bus address.
    ///
    /// Returns a tuple of (MockKeypad, MockKeypadHandle) where the handle
    /// can be used to simulate button presses.
    pub fn new() -> (Self, MockKeypadHandle) {
        Self::with_address(DeviceAddress::DEFAULT_KEYPAD)
    }

    /// Create a new mock keypad at a specific bus address.
    pub fn with_address(address: DeviceAddress) -> (Self, MockKeypadHandle) {
        let (event_tx, event_rx) = mpsc::channel(32);
        let name = format!("Keypad {address}");

        let keypad = Self {
            event_rx,
            name: name.clone(),
            address,
            registration: Registration::default(),
        };

        let handle = MockKeypadHandle { event_tx, name };

        (keypad, handle)
    }

    /// Make [`register`](KeypadDevice::register) fail with `reason`.
    pub fn with_registration_failure(mut self, reason: impl Into<String>) -> Self {
        self.registration = Registration::failing(reason);
        self
    }

    /// Bus address of this keypad.
    pub fn address(&self) -> DeviceAddress {
        self.address
    }

    pub fn is_registered(&self) -> bool {
        self.registration.is_registered()
    }
}

impl KeypadDevice for MockKeypad {
    async fn register(&mut self) -> Result<()> {
        self.registration.register(&self.name)
    }

    async fn read_event(&mut self) -> Result<KeypadEvent> {
        self.registration.ensure(&self.name)?;
        self.event_rx
            .recv()
            .await
            .ok_or_else(|| HardwareError::disconnected(&self.name))
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(self.name.clone(), "Mock Keypad v1.0")
            .with_address(self.address.to_string())
            .with_firmware_version("1.0.0"))
    }
}

/// Handle for driving a mock keypad.
///
/// It can be cloned and shared across tasks.
#[derive(Debug, Clone)]
pub struct MockKeypadHandle {
    /// Channel sender for simulated events
    event_tx: mpsc::Sender<KeypadEvent>,

    /// Device name
    name: String,
}

impl MockKeypadHandle {
    /// Send a raw event to the keypad.
    ///
    /// # Errors
    ///
    /// Returns an error if the keypad has been dropped.
    pub async fn send_event(&self, event: KeypadEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .await
            .map_err(|_| HardwareError::disconnected(&self.name))
    }

    /// Press a button.
    ///
    /// # Errors
    ///
    /// Returns an error if `button` is zero or the keypad has been dropped.
    pub async fn press(&self, button: u8) -> Result<()> {
        let button = ButtonNumber::new(button)?;
        self.send_event(KeypadEvent::Button(ButtonEvent::pressed(button)))
            .await
    }

    /// Release a button.
    pub async fn release(&self, button: u8) -> Result<()> {
        let button = ButtonNumber::new(button)?;
        self.send_event(KeypadEvent::Button(ButtonEvent::released(button)))
            .await
    }

    /// Press then release a button.
    pub async fn tap(&self, button: u8) -> Result<()> {
        self.press(button).await?;
        self.release(button).await
    }

    /// Change the level seen on one of the keypad's input ports.
    pub async fn set_input(&self, port: u8, level: bool) -> Result<()> {
        let port = PortIndex::new(port)?;
        self.send_event(KeypadEvent::InputChanged { port, level })
            .await
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}
