//! Error types for the control program.

use std::path::PathBuf;

use hearth_hardware::HardwareError;
use hearth_serial::SerialError;

/// Result type alias for control operations.
pub type Result<T> = std::result::Result<T, ControlError>;

/// Errors raised by the control program.
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    /// Config file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Config file is not valid TOML or has wrong field types.
    #[error("Failed to parse config file {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// Config values are inconsistent with each other.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Console input named no known command.
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Console command arguments are missing or malformed.
    #[error("Invalid arguments for {command}: {message}")]
    InvalidArguments { command: String, message: String },

    /// A required device was not registered.
    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),

    /// The program has stopped and no longer accepts commands.
    #[error("Control program stopped")]
    Stopped,

    #[error(transparent)]
    Hardware(#[from] HardwareError),

    #[error(transparent)]
    Serial(#[from] SerialError),

    #[error(transparent)]
    Core(#[from] hearth_core::Error),
}

impl ControlError {
    pub fn invalid_arguments(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            command: command.into(),
            message: message.into(),
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ControlError::invalid_arguments("UpPress", "expected a port number");
        assert_eq!(
            err.to_string(),
            "Invalid arguments for UpPress: expected a port number"
        );

        let err = ControlError::UnknownCommand("Jump".to_string());
        assert_eq!(err.to_string(), "Unknown command: Jump");
    }

    #[test]
    fn test_from_hardware_error_is_transparent() {
        let err = ControlError::from(HardwareError::disconnected("COM2"));
        assert_eq!(err.to_string(), "Device disconnected: COM2");
    }
}
