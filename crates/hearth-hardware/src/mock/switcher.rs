//! Mock multi-zone audio switcher.

use crate::{
    HardwareError, Result,
    mock::{Registration, lock},
    traits::AudioSwitcher,
    types::DeviceInfo,
};
use hearth_core::{DeviceAddress, SourceNumber, ZoneNumber};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Zones on the default mock switcher.
pub const DEFAULT_ZONES: u16 = 8;

/// Sources on the default mock switcher.
pub const DEFAULT_SOURCES: u16 = 24;

/// Mock audio switcher with a fixed number of zones and sources.
///
/// Every zone starts with no source routed.
#[derive(Debug)]
pub struct MockAudioSwitcher {
    address: DeviceAddress,
    name: String,
    zones: u16,
    sources: u16,
    registration: Registration,
    routes: Arc<Mutex<HashMap<ZoneNumber, SourceNumber>>>,
}

impl MockAudioSwitcher {
    /// A 24 source by 8 zone switcher at the default address.
    pub fn new() -> (Self, MockAudioSwitcherHandle) {
        Self::with_size(DeviceAddress::DEFAULT_SWITCHER, DEFAULT_SOURCES, DEFAULT_ZONES)
    }

    pub fn with_size(
        address: DeviceAddress,
        sources: u16,
        zones: u16,
    ) -> (Self, MockAudioSwitcherHandle) {
        let routes = Arc::new(Mutex::new(HashMap::new()));

        let switcher = Self {
            address,
            name: format!("Switcher {address}"),
            zones,
            sources,
            registration: Registration::default(),
            routes: Arc::clone(&routes),
        };

        (switcher, MockAudioSwitcherHandle { routes })
    }

    /// Make [`register`](AudioSwitcher::register) fail with `reason`.
    pub fn with_registration_failure(mut self, reason: impl Into<String>) -> Self {
        self.registration = Registration::failing(reason);
        self
    }

    fn check_zone(&self, zone: ZoneNumber) -> Result<()> {
        if zone.as_u16() > self.zones {
            return Err(HardwareError::invalid_data(format!(
                "{} has {} zones, got zone {}",
                self.name, self.zones, zone
            )));
        }
        Ok(())
    }
}

impl AudioSwitcher for MockAudioSwitcher {
    async fn register(&mut self) -> Result<()> {
        self.registration.register(&self.name)
    }

    async fn set_zone_source(&mut self, zone: ZoneNumber, source: SourceNumber) -> Result<()> {
        self.registration.ensure(&self.name)?;
        self.check_zone(zone)?;
        if source.as_u16() > self.sources {
            return Err(HardwareError::invalid_data(format!(
                "{} has {} sources, got source {}",
                self.name, self.sources, source
            )));
        }
        lock(&self.routes).insert(zone, source);
        Ok(())
    }

    async fn zone_source(&self, zone: ZoneNumber) -> Result<SourceNumber> {
        self.registration.ensure(&self.name)?;
        self.check_zone(zone)?;
        Ok(lock(&self.routes)
            .get(&zone)
            .copied()
            .unwrap_or(SourceNumber::NONE))
    }

    fn zone_count(&self) -> u16 {
        self.zones
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(
            self.name.clone(),
            format!("Mock Switcher {}x{}", self.sources, self.zones),
        )
        .with_address(self.address.to_string()))
    }
}

/// Handle for inspecting a mock switcher's routing.
#[derive(Debug, Clone)]
pub struct MockAudioSwitcherHandle {
    routes: Arc<Mutex<HashMap<ZoneNumber, SourceNumber>>>,
}

impl MockAudioSwitcherHandle {
    /// Source routed to `zone`, if one was ever set.
    pub fn source_for(&self, zone: ZoneNumber) -> Option<SourceNumber> {
        lock(&self.routes).get(&zone).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(n: u16) -> ZoneNumber {
        ZoneNumber::new(n).unwrap()
    }

    fn source(n: u16) -> SourceNumber {
        SourceNumber::new(n).unwrap()
    }

    #[tokio::test]
    async fn test_route_and_query() {
        let (mut switcher, handle) = MockAudioSwitcher::new();
        switcher.register().await.unwrap();

        assert_eq!(switcher.zone_source(zone(3)).await.unwrap(), SourceNumber::NONE);

        switcher.set_zone_source(zone(3), source(12)).await.unwrap();

        assert_eq!(switcher.zone_source(zone(3)).await.unwrap(), source(12));
        assert_eq!(handle.source_for(zone(3)), Some(source(12)));
        assert_eq!(handle.source_for(zone(4)), None);
    }

    #[tokio::test]
    async fn test_out_of_range_rejected() {
        let (mut switcher, handle) = MockAudioSwitcher::new();
        switcher.register().await.unwrap();

        assert!(switcher.set_zone_source(zone(9), source(1)).await.is_err());
        assert!(switcher.set_zone_source(zone(1), source(25)).await.is_err());
        assert_eq!(handle.source_for(zone(1)), None);
    }

    #[tokio::test]
    async fn test_info_and_size() {
        let (switcher, _handle) = MockAudioSwitcher::new();

        let info = switcher.get_info().await.unwrap();
        assert_eq!(info.name, "Switcher 0x99");
        assert_eq!(info.model, "Mock Switcher 24x8");
        assert_eq!(switcher.zone_count(), 8);
    }

    #[tokio::test]
    async fn test_registration_failure() {
        let (switcher, _handle) = MockAudioSwitcher::new();
        let mut switcher = switcher.with_registration_failure("Offline");

        assert!(switcher.register().await.is_err());
        assert!(matches!(
            switcher.set_zone_source(zone(1), source(1)).await,
            Err(HardwareError::NotRegistered { .. })
        ));
    }
}
