//! Status of a slot the node reports no block for.
//!
//! A slot stays scheduled for a grace period after its start so that a late
//! block is not recorded as missed. The derivation is a heuristic: a block
//! that arrives after the grace period replaces the missed placeholder the
//! next time its epoch is exported.

use core::time::Duration;
use std::time::SystemTime;

use chain::ChainConfig;
use containers::{BlockStatus, Bytes, Slot};

/// Placeholder root of a slot that may still receive a block.
pub const SCHEDULED_BLOCK_ROOT: u8 = 0x00;

/// Placeholder root of a slot whose proposer did not produce a block.
pub const MISSED_BLOCK_ROOT: u8 = 0x01;

/// Status and placeholder root for a slot starting at `slot_time`.
///
/// Slots in the future or at most `grace` in the past are scheduled.
pub fn derive_block_status(
    slot_time: SystemTime,
    now: SystemTime,
    grace: Duration,
) -> (BlockStatus, Bytes) {
    match now.duration_since(slot_time) {
        Ok(elapsed) if elapsed > grace => (BlockStatus::Missed, Bytes(vec![MISSED_BLOCK_ROOT])),
        _ => (BlockStatus::Scheduled, Bytes(vec![SCHEDULED_BLOCK_ROOT])),
    }
}

#[derive(Clone, Copy, Debug)]
pub struct BlockStatusDeriver {
    chain: ChainConfig,
    grace: Duration,
}

impl BlockStatusDeriver {
    pub fn new(chain: ChainConfig, grace: Duration) -> Self {
        Self { chain, grace }
    }

    pub fn derive(&self, slot: Slot, now: SystemTime) -> (BlockStatus, Bytes) {
        derive_block_status(self.chain.slot_start_time(slot), now, self.grace)
    }
}
