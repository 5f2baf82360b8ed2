//! Sync configuration: constants and the tunables read from the config file.
use core::time::Duration;

use serde::{Deserialize, Serialize};

/// Items requested per page from every paginated node listing.
pub const DEFAULT_PAGE_SIZE: u32 = 250;

/// Seconds between steady-state cycles.
pub const SYNC_INTERVAL_SECS: u64 = 10;

/// Epoch exports in flight during the startup backfill.
pub const MAX_CONCURRENT_BACKFILL_EXPORTS: usize = 10;

/// Epochs before the finalized epoch whose status is refreshed each cycle.
pub const STATUS_LOOKBACK_EPOCHS: u64 = 10;

/// Seconds after its scheduled time a slot without a block is still
/// considered scheduled rather than missed.
pub const MISSED_SLOT_GRACE_SECS: u64 = 60;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    pub page_size: u32,
    pub sync_interval_secs: u64,
    pub backfill_concurrency: usize,
    pub status_lookback_epochs: u64,
    pub missed_slot_grace_secs: u64,
    /// Export every epoch from genesis to head before the first cycle.
    pub full_index_on_startup: bool,
}

impl SyncConfig {
    /// Never zero: a zero period would stall the steady-state ticker.
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs.max(1))
    }

    pub fn missed_slot_grace(&self) -> Duration {
        Duration::from_secs(self.missed_slot_grace_secs)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            sync_interval_secs: SYNC_INTERVAL_SECS,
            backfill_concurrency: MAX_CONCURRENT_BACKFILL_EXPORTS,
            status_lookback_epochs: STATUS_LOOKBACK_EPOCHS,
            missed_slot_grace_secs: MISSED_SLOT_GRACE_SECS,
            full_index_on_startup: false,
        }
    }
}
