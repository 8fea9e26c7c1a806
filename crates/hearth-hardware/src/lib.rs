//! Device abstraction layer for the Hearth control program.
//!
//! This crate provides trait-based abstractions for the peripherals a room
//! controller drives: wall keypads, digital output ports, serial ports, IR
//! emitters and multi-zone audio switchers. Mock implementations of every
//! trait ship with the crate; a native serial backend is available behind
//! the `hardware-serial` feature.
//!
//! # Design
//!
//! - **Async-first**: All I/O operations use native `async fn` in traits
//!   (Rust 1.90 + Edition 2024 RPITIT).
//! - **Enum dispatch**: The traits are not object-safe; [`devices`] wraps
//!   each family in an `Any*` enum for storage and spawning.
//! - **Thread-safe**: All traits require `Send + Sync` for use with Tokio.
//! - **Registration first**: Every device must be registered before use and
//!   registration can fail with a device-supplied reason.
//!
//! # Example
//!
//! ```
//! use hearth_core::PortIndex;
//! use hearth_hardware::mock::MockSerialPort;
//! use hearth_hardware::traits::SerialPort;
//! use hearth_hardware::types::ComSpec;
//!
//! #[tokio::main]
//! async fn main() -> hearth_hardware::Result<()> {
//!     let (mut com2, handle) = MockSerialPort::new(PortIndex::new(2)?);
//!     com2.register().await?;
//!     com2.configure(&ComSpec::default()).await?;
//!
//!     handle.inject("READY\r\n")?;
//!     let chunk = com2.receive().await?;
//!     assert_eq!(&chunk[..], b"READY\r\n");
//!     Ok(())
//! }
//! ```
//!
//! # Error Handling
//!
//! All operations return [`Result<T>`][error::Result] which uses the
//! [`HardwareError`] error type.

pub mod devices;
pub mod error;
pub mod mock;
#[cfg(feature = "hardware-serial")]
pub mod native;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use devices::{AnyAudioSwitcher, AnyDigitalOutput, AnyIrOutput, AnyKeypadDevice, AnySerialPort};
pub use error::{HardwareError, Result};
pub use traits::{AudioSwitcher, DigitalOutput, IrOutput, KeypadDevice, SerialPort};
pub use types::{
    ButtonEvent, ButtonState, ComSpec, DeviceInfo, KeypadEvent, Parity, PortMode, SerialProtocol,
};
