//! Error types for serial line assembly.

/// Result type alias for serial line operations.
pub type Result<T> = std::result::Result<T, SerialError>;

/// Errors raised while assembling or delivering serial lines.
///
/// None of these stop the line assembler. Parse faults clear the pending
/// bytes and handler failures drop the affected line; both are logged.
#[derive(Debug, thiserror::Error)]
pub enum SerialError {
    /// Pending undelimited data grew past the configured limit.
    #[error("Pending line too long: {pending} bytes exceeds limit of {limit}")]
    LineTooLong { pending: usize, limit: usize },

    /// Line content is not valid UTF-8.
    #[error("Invalid UTF-8 in line: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// The line handler's destination is gone.
    #[error("Line handler closed")]
    HandlerClosed,

    /// The line handler rejected a line.
    #[error("Line handler failed: {message}")]
    Handler { message: String },

    /// The assembler task panicked or was aborted.
    #[error("Assembler task failed: {message}")]
    TaskFailed { message: String },
}

impl SerialError {
    /// Create a new handler failure.
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler {
            message: message.into(),
        }
    }

    /// Whether this is a parse fault that discards buffered data.
    pub fn is_parse_fault(&self) -> bool {
        matches!(self, Self::LineTooLong { .. })
    }
}
