use crate::{
    Result,
    constants::{
        DEFAULT_IR_PORT, DEFAULT_KEYPAD_ADDRESS, DEFAULT_RECEIVE_PORT, DEFAULT_SWITCHER_ADDRESS,
        MAX_SOURCE, MAX_ZONE,
    },
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 1-based index of a port within a device collection (serial ports,
/// digital outputs, IR outputs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PortIndex(u8);

impl PortIndex {
    /// Serial port that feeds the line assembler unless configured otherwise.
    pub const DEFAULT_RECEIVE: PortIndex = PortIndex(DEFAULT_RECEIVE_PORT);

    /// IR port cues are emitted on unless configured otherwise.
    pub const DEFAULT_IR: PortIndex = PortIndex(DEFAULT_IR_PORT);

    /// Create a new port index with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidPortIndex` if the index is zero.
    pub fn new(index: u8) -> Result<Self> {
        if index == 0 {
            return Err(Error::InvalidPortIndex(
                "Port indices start at 1, got 0".to_string(),
            ));
        }
        Ok(PortIndex(index))
    }

    /// Get the raw 1-based index.
    #[must_use]
    pub fn as_u8(&self) -> u8 {
        self.0
    }

    /// Position of this port in a zero-based collection.
    #[must_use]
    pub fn offset(&self) -> usize {
        usize::from(self.0) - 1
    }
}

impl TryFrom<u8> for PortIndex {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        PortIndex::new(value)
    }
}

impl From<PortIndex> for u8 {
    fn from(index: PortIndex) -> Self {
        index.0
    }
}

impl fmt::Display for PortIndex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PortIndex {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let index: u8 = s
            .trim()
            .parse()
            .map_err(|_| Error::InvalidPortIndex(format!("Invalid port index: {s}")))?;
        PortIndex::new(index)
    }
}

/// 1-based keypad button number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ButtonNumber(u8);

impl ButtonNumber {
    /// Create a new button number with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidButtonNumber` if the number is zero.
    pub fn new(number: u8) -> Result<Self> {
        if number == 0 {
            return Err(Error::InvalidButtonNumber(
                "Button numbers start at 1, got 0".to_string(),
            ));
        }
        Ok(ButtonNumber(number))
    }

    #[must_use]
    pub fn as_u8(&self) -> u8 {
        self.0
    }

    /// The port with the same number as this button.
    ///
    /// Buttons drive the output, serial port and IR port that share their
    /// number, so button 2 maps to port 2.
    #[must_use]
    pub fn port(&self) -> PortIndex {
        PortIndex(self.0)
    }
}

impl TryFrom<u8> for ButtonNumber {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        ButtonNumber::new(value)
    }
}

impl From<ButtonNumber> for u8 {
    fn from(number: ButtonNumber) -> Self {
        number.0
    }
}

impl fmt::Display for ButtonNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ButtonNumber {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let number: u8 = s
            .trim()
            .parse()
            .map_err(|_| Error::InvalidButtonNumber(format!("Invalid button number: {s}")))?;
        ButtonNumber::new(number)
    }
}

/// Audio zone (room) number on the switcher, 1 to [`MAX_ZONE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct ZoneNumber(u16);

impl ZoneNumber {
    /// Create a new zone number with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidZoneNumber` if the zone is outside 1-`MAX_ZONE`.
    pub fn new(zone: u16) -> Result<Self> {
        if !(1..=MAX_ZONE).contains(&zone) {
            return Err(Error::InvalidZoneNumber(format!(
                "Zone must be 1-{MAX_ZONE}, got {zone}"
            )));
        }
        Ok(ZoneNumber(zone))
    }

    #[must_use]
    pub fn as_u16(&self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for ZoneNumber {
    type Error = Error;

    fn try_from(value: u16) -> Result<Self> {
        ZoneNumber::new(value)
    }
}

impl From<ZoneNumber> for u16 {
    fn from(zone: ZoneNumber) -> Self {
        zone.0
    }
}

impl fmt::Display for ZoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ZoneNumber {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let zone: u16 = s
            .trim()
            .parse()
            .map_err(|_| Error::InvalidZoneNumber(format!("Invalid zone number: {s}")))?;
        ZoneNumber::new(zone)
    }
}

/// Audio source number on the switcher, 0 (no source) to [`MAX_SOURCE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct SourceNumber(u16);

impl SourceNumber {
    /// The "no source" value that silences a zone.
    pub const NONE: SourceNumber = SourceNumber(0);

    /// Create a new source number with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidSourceNumber` if the source is above `MAX_SOURCE`.
    pub fn new(source: u16) -> Result<Self> {
        if source > MAX_SOURCE {
            return Err(Error::InvalidSourceNumber(format!(
                "Source must be 0-{MAX_SOURCE}, got {source}"
            )));
        }
        Ok(SourceNumber(source))
    }

    #[must_use]
    pub fn as_u16(&self) -> u16 {
        self.0
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<u16> for SourceNumber {
    type Error = Error;

    fn try_from(value: u16) -> Result<Self> {
        SourceNumber::new(value)
    }
}

impl From<SourceNumber> for u16 {
    fn from(source: SourceNumber) -> Self {
        source.0
    }
}

impl fmt::Display for SourceNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SourceNumber {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let source: u16 = s
            .trim()
            .parse()
            .map_err(|_| Error::InvalidSourceNumber(format!("Invalid source number: {s}")))?;
        SourceNumber::new(source)
    }
}

/// Bus address of a device on the control network (e.g. `0x25`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DeviceAddress(u8);

impl DeviceAddress {
    /// Factory default address of a wall keypad.
    pub const DEFAULT_KEYPAD: DeviceAddress = DeviceAddress(DEFAULT_KEYPAD_ADDRESS);

    /// Factory default address of an audio switcher.
    pub const DEFAULT_SWITCHER: DeviceAddress = DeviceAddress(DEFAULT_SWITCHER_ADDRESS);

    /// Create a new device address.
    ///
    /// # Errors
    /// Returns `Error::InvalidDeviceAddress` for `0x00`, which is reserved for
    /// the control processor itself.
    pub fn new(address: u8) -> Result<Self> {
        if address == 0 {
            return Err(Error::InvalidDeviceAddress(
                "Address 0x00 is reserved".to_string(),
            ));
        }
        Ok(DeviceAddress(address))
    }

    #[must_use]
    pub fn as_u8(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for DeviceAddress {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        DeviceAddress::new(value)
    }
}

impl From<DeviceAddress> for u8 {
    fn from(address: DeviceAddress) -> Self {
        address.0
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}
