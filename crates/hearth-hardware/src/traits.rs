//! Hardware device trait definitions.
//!
//! One trait per device family attached to the control processor: keypads,
//! digital output ports, serial ports, IR emitters and audio switchers. The
//! program talks to every device through these traits so mock and native
//! implementations can be swapped freely.
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT),
//! eliminating the need for the `async_trait` macro.
//!
//! Every device must be registered with [`register`](KeypadDevice::register)
//! before any other operation. Registration may fail; the caller decides
//! whether to carry on without the device.

#![allow(async_fn_in_trait)]

use bytes::Bytes;
use hearth_core::{SourceNumber, ZoneNumber};

use crate::error::Result;
use crate::types::{ComSpec, DeviceInfo, KeypadEvent, PortMode};

/// Keypad with buttons and digital input ports.
///
/// # Object Safety and Dynamic Dispatch
///
/// This trait is NOT object-safe because `async fn` methods return
/// `impl Future`. You cannot use `Box<dyn KeypadDevice>`. Use generic
/// parameters, or the enum wrappers in [`devices`](crate::devices) when a
/// concrete type is needed (e.g. to spawn a task).
///
/// # Examples
///
/// ```no_run
/// use hearth_hardware::traits::KeypadDevice;
/// use hearth_hardware::types::KeypadEvent;
/// use hearth_hardware::error::Result;
///
/// async fn wait_for_button<K: KeypadDevice>(keypad: &mut K) -> Result<u8> {
///     loop {
///         if let KeypadEvent::Button(event) = keypad.read_event().await? {
///             return Ok(event.button.as_u8());
///         }
///     }
/// }
/// ```
pub trait KeypadDevice: Send + Sync {
    /// Register the keypad with the control processor.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::RegistrationFailed`](crate::HardwareError::RegistrationFailed)
    /// with the device's reason when registration is refused.
    async fn register(&mut self) -> Result<()>;

    /// Wait for the next button or input port change.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is not registered or has been
    /// disconnected.
    async fn read_event(&mut self) -> Result<KeypadEvent>;

    /// Get device information.
    async fn get_info(&self) -> Result<DeviceInfo>;
}

/// Digital output port on the control processor.
pub trait DigitalOutput: Send + Sync {
    /// Register the port with the control processor.
    ///
    /// # Errors
    ///
    /// Returns `RegistrationFailed` when registration is refused.
    async fn register(&mut self) -> Result<()>;

    /// Set the port direction.
    async fn configure(&mut self, mode: PortMode) -> Result<()>;

    /// Drive the port high (`true`) or low (`false`).
    ///
    /// # Errors
    ///
    /// Returns `Unsupported` if the port is not configured as an output, or
    /// `NotRegistered` before registration.
    async fn set_level(&mut self, level: bool) -> Result<()>;

    /// Current driven level.
    async fn level(&self) -> Result<bool>;

    /// Get device information.
    async fn get_info(&self) -> Result<DeviceInfo>;
}

/// Serial (COM) port.
///
/// `send` and `receive` take `&self` so one task can block in `receive`
/// while another sends on the same port through a shared reference.
///
/// # Examples
///
/// ```no_run
/// use hearth_hardware::traits::SerialPort;
/// use hearth_hardware::types::ComSpec;
/// use hearth_hardware::error::Result;
///
/// async fn open<P: SerialPort>(port: &mut P) -> Result<()> {
///     port.register().await?;
///     port.configure(&ComSpec::default()).await?;
///     port.send(b"hello\n").await
/// }
/// ```
pub trait SerialPort: Send + Sync {
    /// Register the port with the control processor.
    ///
    /// # Errors
    ///
    /// Returns `RegistrationFailed` when registration is refused.
    async fn register(&mut self) -> Result<()>;

    /// Apply line settings.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the settings are invalid or the port
    /// cannot apply them.
    async fn configure(&mut self, spec: &ComSpec) -> Result<()>;

    /// Transmit bytes.
    async fn send(&self, data: &[u8]) -> Result<()>;

    /// Wait for the next chunk of received bytes.
    ///
    /// Chunk boundaries are arbitrary: a chunk may hold part of a message,
    /// or several messages.
    ///
    /// # Errors
    ///
    /// Returns `Disconnected` once no more data can arrive.
    async fn receive(&self) -> Result<Bytes>;

    /// Get device information.
    async fn get_info(&self) -> Result<DeviceInfo>;
}

/// IR emitter port.
pub trait IrOutput: Send + Sync {
    /// Register the port with the control processor.
    async fn register(&mut self) -> Result<()>;

    /// Start emitting a named command. The command repeats until released.
    async fn press(&mut self, command: &str) -> Result<()>;

    /// Stop emitting.
    async fn release(&mut self) -> Result<()>;

    /// Get device information.
    async fn get_info(&self) -> Result<DeviceInfo>;
}

/// Multi-zone audio switcher.
pub trait AudioSwitcher: Send + Sync {
    /// Register the switcher with the control processor.
    async fn register(&mut self) -> Result<()>;

    /// Route a source to a zone. [`SourceNumber::NONE`] mutes the zone.
    ///
    /// # Errors
    ///
    /// Returns `InvalidData` if the zone or source is beyond what this
    /// switcher has.
    async fn set_zone_source(&mut self, zone: ZoneNumber, source: SourceNumber) -> Result<()>;

    /// Source currently routed to a zone.
    async fn zone_source(&self, zone: ZoneNumber) -> Result<SourceNumber>;

    /// Number of zones this switcher drives.
    fn zone_count(&self) -> u16;

    /// Get device information.
    async fn get_info(&self) -> Result<DeviceInfo>;
}
