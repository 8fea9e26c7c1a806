//! Error types for hardware operations.
//!
//! This module defines error types specific to device operations, covering
//! registration with the control processor, disconnection, configuration and
//! communication failures.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware device operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device refused registration with the control processor.
    #[error("Registration failed for {device}: {reason}")]
    RegistrationFailed { device: String, reason: String },

    /// Device was used before a successful registration.
    #[error("Device not registered: {device}")]
    NotRegistered { device: String },

    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Operation is not supported by this device.
    #[error("Unsupported operation: {operation}")]
    Unsupported { operation: String },

    /// Device communication error.
    #[error("Communication error: {message}")]
    CommunicationError { message: String },

    /// Invalid data received from or sent to a device.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Device configuration error.
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    /// Create a new registration failure.
    pub fn registration_failed(device: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::RegistrationFailed {
            device: device.into(),
            reason: reason.into(),
        }
    }

    /// Create a new not-registered error.
    pub fn not_registered(device: impl Into<String>) -> Self {
        Self::NotRegistered {
            device: device.into(),
        }
    }

    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new unsupported operation error.
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::CommunicationError {
            message: message.into(),
        }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }
}

impl From<hearth_core::Error> for HardwareError {
    fn from(error: hearth_core::Error) -> Self {
        Self::InvalidData {
            message: error.to_string(),
        }
    }
}
