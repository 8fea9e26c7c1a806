//! Control program configuration.
//!
//! Loaded from TOML. Every field has a default matching a two-button wall
//! keypad, two digital outputs, two serial ports wired in loopback with the
//! second one feeding the line assembler, one IR port and a 24x8 audio
//! switcher.
//!
//! ```toml
//! log_filter = "info,hearth_control=debug"
//! digital_outputs = 2
//!
//! [keypad]
//! address = 0x25
//!
//! [[keypad.buttons]]
//! button = 1
//! action = { cue = "up" }
//!
//! [serial]
//! ports = 2
//! receive_port = 2
//! max_pending = 65536
//!
//! [serial.spec]
//! baud_rate = 19200
//! ```

use std::path::Path;

use hearth_core::constants::{
    DEFAULT_DIGITAL_OUTPUT_COUNT, DEFAULT_MAX_PENDING, DEFAULT_SERIAL_PORT_COUNT,
    IR_DOWN_COMMAND, IR_UP_COMMAND,
};
use hearth_core::{ButtonNumber, DeviceAddress, PortIndex};
use hearth_hardware::ComSpec;
use hearth_serial::AssemblerConfig;
use serde::{Deserialize, Serialize};

use crate::actions::{ButtonAction, Cue};
use crate::error::{ControlError, Result};

/// Complete control program configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: String,

    /// Number of digital output ports to drive.
    pub digital_outputs: u8,

    pub keypad: KeypadConfig,
    pub serial: SerialConfig,
    pub ir: IrConfig,
    pub switcher: SwitcherConfig,
    pub payloads: CuePayloads,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            digital_outputs: DEFAULT_DIGITAL_OUTPUT_COUNT,
            keypad: KeypadConfig::default(),
            serial: SerialConfig::default(),
            ir: IrConfig::default(),
            switcher: SwitcherConfig::default(),
            payloads: CuePayloads::default(),
        }
    }
}

impl ControlConfig {
    /// Parse a TOML document. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigParse` for malformed TOML and `InvalidConfig` if the
    /// values are inconsistent.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).map_err(|e| ControlError::ConfigParse {
            path: "<inline>".into(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ControlError::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Self = toml::from_str(&contents).map_err(|e| ControlError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field consistency.
    pub fn validate(&self) -> Result<()> {
        if self.serial.receive_port.as_u8() > self.serial.ports {
            return Err(ControlError::invalid_config(format!(
                "receive_port {} exceeds serial port count {}",
                self.serial.receive_port, self.serial.ports
            )));
        }
        if self.serial.max_pending == 0 {
            return Err(ControlError::invalid_config("max_pending must be non-zero"));
        }
        self.serial.spec.validate()?;

        let mut seen = std::collections::HashSet::new();
        for binding in &self.keypad.buttons {
            if !seen.insert(binding.button) {
                return Err(ControlError::invalid_config(format!(
                    "button {} is bound more than once",
                    binding.button
                )));
            }
        }
        Ok(())
    }

    /// Line assembler settings derived from this config.
    pub fn assembler(&self) -> AssemblerConfig {
        AssemblerConfig {
            max_pending: self.serial.max_pending,
        }
    }
}

/// One button binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonBindingConfig {
    pub button: ButtonNumber,
    pub action: ButtonAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeypadConfig {
    pub address: DeviceAddress,
    pub buttons: Vec<ButtonBindingConfig>,
}

impl Default for KeypadConfig {
    fn default() -> Self {
        let binding = |button: u8, cue: Cue| {
            ButtonNumber::new(button).map(|button| ButtonBindingConfig {
                button,
                action: ButtonAction::Cue(cue),
            })
        };

        Self {
            address: DeviceAddress::DEFAULT_KEYPAD,
            // Button 1 is Up, button 2 is Down.
            buttons: [binding(1, Cue::Up), binding(2, Cue::Down)]
                .into_iter()
                .flatten()
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Number of serial ports to register.
    pub ports: u8,

    /// Port whose received data feeds the line assembler.
    pub receive_port: PortIndex,

    /// Line settings applied to every port.
    pub spec: ComSpec,

    /// Longest undelimited run the assembler holds before discarding it.
    pub max_pending: usize,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            ports: DEFAULT_SERIAL_PORT_COUNT,
            receive_port: PortIndex::DEFAULT_RECEIVE,
            spec: ComSpec::default(),
            max_pending: DEFAULT_MAX_PENDING,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IrConfig {
    /// IR port the cues are emitted on.
    pub port: PortIndex,
    pub up_command: String,
    pub down_command: String,
}

impl IrConfig {
    /// IR command emitted for `cue`.
    pub fn command(&self, cue: Cue) -> &str {
        match cue {
            Cue::Up => &self.up_command,
            Cue::Down => &self.down_command,
        }
    }
}

impl Default for IrConfig {
    fn default() -> Self {
        Self {
            port: PortIndex::DEFAULT_IR,
            up_command: IR_UP_COMMAND.to_string(),
            down_command: IR_DOWN_COMMAND.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwitcherConfig {
    pub address: DeviceAddress,
}

impl Default for SwitcherConfig {
    fn default() -> Self {
        Self {
            address: DeviceAddress::DEFAULT_SWITCHER,
        }
    }
}

/// Serial data sent on each cue edge. `None` sends nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CuePayloads {
    pub up_press: Option<String>,
    pub up_release: Option<String>,
    pub down_press: Option<String>,
    pub down_release: Option<String>,
}

impl CuePayloads {
    pub fn press(&self, cue: Cue) -> Option<&str> {
        match cue {
            Cue::Up => self.up_press.as_deref(),
            Cue::Down => self.down_press.as_deref(),
        }
    }

    pub fn release(&self, cue: Cue) -> Option<&str> {
        match cue {
            Cue::Up => self.up_release.as_deref(),
            Cue::Down => self.down_release.as_deref(),
        }
    }
}

impl Default for CuePayloads {
    fn default() -> Self {
        Self {
            up_press: Some("Test transmission, please ignore".to_string()),
            up_release: Some(" ".to_string()),
            down_press: Some("\n".to_string()),
            down_release: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::Trigger;
    use hearth_hardware::Parity;

    #[test]
    fn test_empty_document_is_default() {
        let config = ControlConfig::from_toml_str("").unwrap();
        assert_eq!(config, ControlConfig::default());
        assert_eq!(config.serial.receive_port.as_u8(), 2);
        assert_eq!(config.keypad.buttons.len(), 2);
        assert_eq!(config.ir.command(Cue::Down), "DN_ARROW");
    }

    #[test]
    fn test_partial_document() {
        let config = ControlConfig::from_toml_str(
            r#"
            digital_outputs = 4

            [keypad]
            address = 0x30

            [[keypad.buttons]]
            button = 3
            action = { trigger = "all_off" }

            [serial.spec]
            baud_rate = 9600
            parity = "odd"

            [payloads]
            down_release = "STOP\r\n"
            "#,
        )
        .unwrap();

        assert_eq!(config.digital_outputs, 4);
        assert_eq!(config.keypad.address.as_u8(), 0x30);
        assert_eq!(
            config.keypad.buttons[0].action,
            ButtonAction::Trigger(Trigger::AllOff)
        );
        assert_eq!(config.serial.spec.baud_rate, 9600);
        assert_eq!(config.serial.spec.parity, Parity::Odd);
        assert_eq!(config.serial.spec.data_bits, 8);
        assert_eq!(config.payloads.release(Cue::Down), Some("STOP\r\n"));
        assert_eq!(config.payloads.press(Cue::Up), Some("Test transmission, please ignore"));
    }

    #[test]
    fn test_receive_port_out_of_range() {
        let err = ControlConfig::from_toml_str(
            r#"
            [serial]
            ports = 1
            receive_port = 2
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ControlError::InvalidConfig(_)));
    }

    #[test]
    fn test_duplicate_button_rejected() {
        let err = ControlConfig::from_toml_str(
            r#"
            [[keypad.buttons]]
            button = 1
            action = { cue = "up" }

            [[keypad.buttons]]
            button = 1
            action = { cue = "down" }
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ControlError::InvalidConfig(_)));
    }

    #[test]
    fn test_zero_address_rejected() {
        let err = ControlConfig::from_toml_str("[keypad]\naddress = 0").unwrap_err();
        assert!(matches!(err, ControlError::ConfigParse { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ControlConfig::load(Path::new("/nonexistent/hearth.toml")).unwrap_err();
        assert!(matches!(err, ControlError::ConfigRead { .. }));
    }
}
