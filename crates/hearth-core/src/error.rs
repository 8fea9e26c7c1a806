use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid port index: {0}")]
    InvalidPortIndex(String),

    #[error("Invalid button number: {0}")]
    InvalidButtonNumber(String),

    #[error("Invalid zone number: {0}")]
    InvalidZoneNumber(String),

    #[error("Invalid source number: {0}")]
    InvalidSourceNumber(String),

    #[error("Invalid device address: {0}")]
    InvalidDeviceAddress(String),
}

pub type Result<T> = std::result::Result<T, Error>;
