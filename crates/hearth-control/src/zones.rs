//! Audio zone routing.

use hearth_core::{SourceNumber, ZoneNumber};
use hearth_hardware::{AnyAudioSwitcher, AudioSwitcher};
use tracing::info;

use crate::error::{ControlError, Result};

/// Routes audio sources to rooms through the matrix switcher.
#[derive(Debug, Default)]
pub struct ZoneController {
    switcher: Option<AnyAudioSwitcher>,
}

impl ZoneController {
    /// `None` when the switcher is absent or failed registration; every
    /// routing call then returns `DeviceUnavailable`.
    pub fn new(switcher: Option<AnyAudioSwitcher>) -> Self {
        Self { switcher }
    }

    pub fn is_available(&self) -> bool {
        self.switcher.is_some()
    }

    /// Route `source` to `zone`. `SourceNumber::NONE` mutes the zone.
    pub async fn set_source_for_room(
        &mut self,
        zone: ZoneNumber,
        source: SourceNumber,
    ) -> Result<()> {
        let switcher = self.switcher_mut()?;
        switcher.set_zone_source(zone, source).await?;
        info!("Zone {} -> source {}", zone, source);
        Ok(())
    }

    /// Mute every zone on the switcher.
    pub async fn all_off(&mut self) -> Result<()> {
        let switcher = self.switcher_mut()?;
        for zone in 1..=switcher.zone_count() {
            switcher
                .set_zone_source(ZoneNumber::new(zone)?, SourceNumber::NONE)
                .await?;
        }
        info!("All zones off");
        Ok(())
    }

    fn switcher_mut(&mut self) -> Result<&mut AnyAudioSwitcher> {
        self.switcher
            .as_mut()
            .ok_or_else(|| ControlError::DeviceUnavailable("audio switcher".to_string()))
    }
}
