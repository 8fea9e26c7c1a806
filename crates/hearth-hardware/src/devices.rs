//! Enum wrappers for hardware device dispatch.
//!
//! Native `async fn` in traits are not object-safe, so `Box<dyn SerialPort>`
//! is not an option. These enums give the control program one concrete type
//! per device family, which it can store in collections and move into
//! spawned tasks.
//!
//! # Examples
//!
//! ```
//! use hearth_core::PortIndex;
//! use hearth_hardware::devices::AnySerialPort;
//! use hearth_hardware::mock::MockSerialPort;
//!
//! let (port, _handle) = MockSerialPort::new(PortIndex::new(1).unwrap());
//! let any_port = AnySerialPort::Mock(port);
//! ```

use bytes::Bytes;
use hearth_core::{SourceNumber, ZoneNumber};

use crate::mock::{MockAudioSwitcher, MockDigitalOutput, MockIrOutput, MockKeypad, MockSerialPort};
#[cfg(feature = "hardware-serial")]
use crate::native::NativeSerialPort;
use crate::traits::{AudioSwitcher, DigitalOutput, IrOutput, KeypadDevice, SerialPort};
use crate::types::{ComSpec, DeviceInfo, KeypadEvent, PortMode};
use crate::Result;

/// Enum wrapper for keypad dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyKeypadDevice {
    /// Mock keypad for development and testing.
    Mock(MockKeypad),
}

impl KeypadDevice for AnyKeypadDevice {
    async fn register(&mut self) -> Result<()> {
        match self {
            Self::Mock(device) => device.register().await,
        }
    }

    async fn read_event(&mut self) -> Result<KeypadEvent> {
        match self {
            Self::Mock(device) => device.read_event().await,
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            Self::Mock(device) => device.get_info().await,
        }
    }
}

impl From<MockKeypad> for AnyKeypadDevice {
    fn from(device: MockKeypad) -> Self {
        Self::Mock(device)
    }
}

/// Enum wrapper for digital output dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyDigitalOutput {
    Mock(MockDigitalOutput),
}

impl DigitalOutput for AnyDigitalOutput {
    async fn register(&mut self) -> Result<()> {
        match self {
            Self::Mock(device) => device.register().await,
        }
    }

    async fn configure(&mut self, mode: PortMode) -> Result<()> {
        match self {
            Self::Mock(device) => device.configure(mode).await,
        }
    }

    async fn set_level(&mut self, level: bool) -> Result<()> {
        match self {
            Self::Mock(device) => device.set_level(level).await,
        }
    }

    async fn level(&self) -> Result<bool> {
        match self {
            Self::Mock(device) => device.level().await,
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            Self::Mock(device) => device.get_info().await,
        }
    }
}

impl From<MockDigitalOutput> for AnyDigitalOutput {
    fn from(device: MockDigitalOutput) -> Self {
        Self::Mock(device)
    }
}

/// Enum wrapper for serial port dispatch.
///
/// With the `hardware-serial` feature, a `Native` variant drives an OS
/// serial device.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnySerialPort {
    /// Mock port for development and testing.
    Mock(MockSerialPort),

    /// OS serial device.
    #[cfg(feature = "hardware-serial")]
    Native(NativeSerialPort),
}

impl SerialPort for AnySerialPort {
    async fn register(&mut self) -> Result<()> {
        match self {
            Self::Mock(device) => device.register().await,
            #[cfg(feature = "hardware-serial")]
            Self::Native(device) => device.register().await,
        }
    }

    async fn configure(&mut self, spec: &ComSpec) -> Result<()> {
        match self {
            Self::Mock(device) => device.configure(spec).await,
            #[cfg(feature = "hardware-serial")]
            Self::Native(device) => device.configure(spec).await,
        }
    }

    async fn send(&self, data: &[u8]) -> Result<()> {
        match self {
            Self::Mock(device) => device.send(data).await,
            #[cfg(feature = "hardware-serial")]
            Self::Native(device) => device.send(data).await,
        }
    }

    async fn receive(&self) -> Result<Bytes> {
        match self {
            Self::Mock(device) => device.receive().await,
            #[cfg(feature = "hardware-serial")]
            Self::Native(device) => device.receive().await,
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            Self::Mock(device) => device.get_info().await,
            #[cfg(feature = "hardware-serial")]
            Self::Native(device) => device.get_info().await,
        }
    }
}

impl From<MockSerialPort> for AnySerialPort {
    fn from(device: MockSerialPort) -> Self {
        Self::Mock(device)
    }
}

#[cfg(feature = "hardware-serial")]
impl From<NativeSerialPort> for AnySerialPort {
    fn from(device: NativeSerialPort) -> Self {
        Self::Native(device)
    }
}

/// Enum wrapper for IR output dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyIrOutput {
    Mock(MockIrOutput),
}

impl IrOutput for AnyIrOutput {
    async fn register(&mut self) -> Result<()> {
        match self {
            Self::Mock(device) => device.register().await,
        }
    }

    async fn press(&mut self, command: &str) -> Result<()> {
        match self {
            Self::Mock(device) => device.press(command).await,
        }
    }

    async fn release(&mut self) -> Result<()> {
        match self {
            Self::Mock(device) => device.release().await,
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            Self::Mock(device) => device.get_info().await,
        }
    }
}

impl From<MockIrOutput> for AnyIrOutput {
    fn from(device: MockIrOutput) -> Self {
        Self::Mock(device)
    }
}

/// Enum wrapper for audio switcher dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyAudioSwitcher {
    Mock(MockAudioSwitcher),
}

impl AudioSwitcher for AnyAudioSwitcher {
    async fn register(&mut self) -> Result<()> {
        match self {
            Self::Mock(device) => device.register().await,
        }
    }

    async fn set_zone_source(&mut self, zone: ZoneNumber, source: SourceNumber) -> Result<()> {
        match self {
            Self::Mock(device) => device.set_zone_source(zone, source).await,
        }
    }

    async fn zone_source(&self, zone: ZoneNumber) -> Result<SourceNumber> {
        match self {
            Self::Mock(device) => device.zone_source(zone).await,
        }
    }

    fn zone_count(&self) -> u16 {
        match self {
            Self::Mock(device) => device.zone_count(),
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            Self::Mock(device) => device.get_info().await,
        }
    }
}

impl From<MockAudioSwitcher> for AnyAudioSwitcher {
    fn from(device: MockAudioSwitcher) -> Self {
        Self::Mock(device)
    }
}
