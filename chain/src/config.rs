use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub type Slot = u64;
pub type Epoch = u64;

pub const GENESIS_EPOCH: Epoch = 0;

pub const SECONDS_PER_SLOT: u64 = 12;
pub const SLOTS_PER_EPOCH: u64 = 32;
pub const MAINNET_GENESIS_TIME: u64 = 1_606_824_023;

/// Timing parameters of the beacon chain being exported.
///
/// Everything the exporter needs to turn slots into epochs and wall-clock
/// times lives here. Values come from the YAML config file when present and
/// default to mainnet otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ChainConfig {
    /// Unix timestamp (seconds) of slot 0.
    pub genesis_time: u64,
    pub seconds_per_slot: u64,
    pub slots_per_epoch: u64,
}

pub const MAINNET_CONFIG: ChainConfig = ChainConfig {
    genesis_time: MAINNET_GENESIS_TIME,
    seconds_per_slot: SECONDS_PER_SLOT,
    slots_per_epoch: SLOTS_PER_EPOCH,
};

impl Default for ChainConfig {
    fn default() -> Self {
        MAINNET_CONFIG
    }
}

impl ChainConfig {
    pub fn epoch_start_slot(&self, epoch: Epoch) -> Slot {
        epoch.saturating_mul(self.slots_per_epoch)
    }

    /// All slots belonging to `epoch`, first to last.
    pub fn slots_in_epoch(&self, epoch: Epoch) -> RangeInclusive<Slot> {
        let start = self.epoch_start_slot(epoch);
        start..=start.saturating_add(self.slots_per_epoch.saturating_sub(1))
    }

    /// Wall-clock time at which `slot` starts.
    pub fn slot_start_time(&self, slot: Slot) -> SystemTime {
        let offset = slot.saturating_mul(self.seconds_per_slot);
        UNIX_EPOCH + Duration::from_secs(self.genesis_time.saturating_add(offset))
    }
}
