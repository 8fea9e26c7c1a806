//! Common types shared across device implementations.
//!
//! This module defines device information, keypad events and serial port
//! line settings.

use chrono::{DateTime, Utc};
use hearth_core::constants::{DEFAULT_BAUD_RATE, DEFAULT_DATA_BITS, DEFAULT_STOP_BITS};
use hearth_core::{ButtonNumber, PortIndex};
use serde::{Deserialize, Serialize};

use crate::error::{HardwareError, Result};

/// Generic device information.
///
/// Contains metadata about a device such as name, model and bus address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device name (e.g., "COM1", "Mock Keypad").
    pub name: String,

    /// Device model identifier.
    pub model: String,

    /// Optional bus address or port path.
    pub address: Option<String>,

    /// Optional firmware version string.
    pub firmware_version: Option<String>,
}

impl DeviceInfo {
    /// Create a new DeviceInfo with required fields.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            address: None,
            firmware_version: None,
        }
    }

    /// Set the address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Set the firmware version.
    pub fn with_firmware_version(mut self, firmware_version: impl Into<String>) -> Self {
        self.firmware_version = Some(firmware_version.into());
        self
    }
}

/// Physical state of a keypad button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonState {
    Pressed,
    Released,
}

impl std::fmt::Display for ButtonState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pressed => write!(f, "pressed"),
            Self::Released => write!(f, "released"),
        }
    }
}

/// A button changed state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonEvent {
    /// Button that changed.
    pub button: ButtonNumber,

    /// New state.
    pub state: ButtonState,

    /// When the change was observed.
    pub timestamp: DateTime<Utc>,
}

impl ButtonEvent {
    /// Create a button event stamped with the current time.
    pub fn new(button: ButtonNumber, state: ButtonState) -> Self {
        Self {
            button,
            state,
            timestamp: Utc::now(),
        }
    }

    pub fn pressed(button: ButtonNumber) -> Self {
        Self::new(button, ButtonState::Pressed)
    }

    pub fn released(button: ButtonNumber) -> Self {
        Self::new(button, ButtonState::Released)
    }
}

/// Event reported by a keypad.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum KeypadEvent {
    /// A button was pressed or released.
    Button(ButtonEvent),

    /// One of the keypad's digital input ports changed level.
    InputChanged {
        /// Input port that changed.
        port: PortIndex,

        /// New level (`true` = high).
        level: bool,
    },
}

/// Direction of a general purpose I/O port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortMode {
    /// Port reads a level; it cannot be driven. Ports power up this way.
    #[default]
    DigitalInput,

    /// Port drives a level.
    DigitalOutput,
}

/// Serial parity mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parity {
    #[default]
    None,
    Odd,
    Even,
}

/// Electrical signalling used on a serial port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SerialProtocol {
    #[default]
    Rs232,
    Rs422,
    Rs485,
}

/// Line settings for a serial port.
///
/// Defaults to 19200 baud, 8 data bits, no parity, 1 stop bit, RS-232 and no
/// handshaking.
///
/// # Examples
///
/// ```
/// use hearth_hardware::types::{ComSpec, Parity};
///
/// let spec = ComSpec::default();
/// assert_eq!(spec.baud_rate, 19_200);
/// assert_eq!(spec.parity, Parity::None);
/// assert!(spec.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComSpec {
    pub baud_rate: u32,
    pub data_bits: u8,
    pub parity: Parity,
    pub stop_bits: u8,
    pub protocol: SerialProtocol,
    pub hardware_handshake: bool,
    pub software_handshake: bool,
}

impl ComSpec {
    /// Check that every field is within what a UART can do.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a zero baud rate, data bits outside
    /// 5-8, stop bits outside 1-2, or both handshakes enabled at once.
    pub fn validate(&self) -> Result<()> {
        if self.baud_rate == 0 {
            return Err(HardwareError::configuration("Baud rate must be non-zero"));
        }
        if !(5..=8).contains(&self.data_bits) {
            return Err(HardwareError::configuration(format!(
                "Data bits must be 5-8, got {}",
                self.data_bits
            )));
        }
        if !(1..=2).contains(&self.stop_bits) {
            return Err(HardwareError::configuration(format!(
                "Stop bits must be 1-2, got {}",
                self.stop_bits
            )));
        }
        if self.hardware_handshake && self.software_handshake {
            return Err(HardwareError::configuration(
                "Hardware and software handshake are mutually exclusive",
            ));
        }
        Ok(())
    }
}

impl Default for ComSpec {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: DEFAULT_DATA_BITS,
            parity: Parity::None,
            stop_bits: DEFAULT_STOP_BITS,
            protocol: SerialProtocol::Rs232,
            hardware_handshake: false,
            software_handshake: false,
        }
    }
}

impl std::fmt::Display for ComSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parity = match self.parity {
            Parity::None => 'N',
            Parity::Odd => 'O',
            Parity::Even => 'E',
        };
        write!(
            f,
            "{} {}{}{}",
            self.baud_rate, self.data_bits, parity, self.stop_bits
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_device_info_builder() {
        let info = DeviceInfo::new("Keypad", "Mock Keypad v1.0")
            .with_address("0x25")
            .with_firmware_version("1.0.0");

        assert_eq!(info.name, "Keypad");
        assert_eq!(info.address, Some("0x25".to_string()));
        assert_eq!(info.firmware_version, Some("1.0.0".to_string()));
    }

    #[test]
    fn test_button_event_constructors() {
        let button = ButtonNumber::new(1).unwrap();

        assert_eq!(ButtonEvent::pressed(button).state, ButtonState::Pressed);
        assert_eq!(ButtonEvent::released(button).state, ButtonState::Released);
    }

    #[test]
    fn test_com_spec_default_display() {
        assert_eq!(ComSpec::default().to_string(), "19200 8N1");
    }

    #[rstest]
    #[case(ComSpec { baud_rate: 0, ..ComSpec::default() })]
    #[case(ComSpec { data_bits: 9, ..ComSpec::default() })]
    #[case(ComSpec { data_bits: 4, ..ComSpec::default() })]
    #[case(ComSpec { stop_bits: 3, ..ComSpec::default() })]
    #[case(ComSpec { hardware_handshake: true, software_handshake: true, ..ComSpec::default() })]
    fn test_com_spec_rejects_invalid(#[case] spec: ComSpec) {
        assert!(matches!(
            spec.validate(),
            Err(HardwareError::ConfigurationError { .. })
        ));
    }

    #[test]
    fn test_com_spec_partial_deserialize() {
        let spec: ComSpec =
            serde_json::from_str(r#"{"baud_rate": 9600, "parity": "even"}"#).unwrap();

        assert_eq!(spec.baud_rate, 9600);
        assert_eq!(spec.parity, Parity::Even);
        assert_eq!(spec.data_bits, 8);
        assert_eq!(spec.protocol, SerialProtocol::Rs232);
    }
}
