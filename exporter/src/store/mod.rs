pub mod file;
pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use containers::{Attestation, Epoch, EpochData, EpochParticipation, MinimalBlock, ValidatorQueue};

pub use file::{FileStore, StoreError};
pub use memory::MemoryStore;

/// Persistence of exported epochs and pool snapshots.
///
/// Implementations must make `save_epoch` all-or-nothing and must accept
/// concurrent saves of distinct epochs.
#[async_trait]
pub trait EpochStore: Send + Sync {
    /// Insert or overwrite everything stored for `data.epoch`.
    async fn save_epoch(&self, data: EpochData) -> Result<()>;

    /// Overwrite only the participation/finalization status of a stored
    /// epoch. Epochs that are not stored are left alone.
    async fn update_epoch_status(&self, participation: &EpochParticipation) -> Result<()>;

    /// Scheduled and proposed blocks of epochs `start..=end`.
    ///
    /// Missed slots are left out: they can never match a node-reported
    /// block and are refreshed through their epoch's other slots.
    async fn blocks_in_range(&self, start: Epoch, end: Epoch) -> Result<Vec<MinimalBlock>>;

    /// Every stored epoch, ascending.
    async fn stored_epochs(&self) -> Result<Vec<Epoch>>;

    /// Replace the stored attestation pool snapshot.
    async fn save_attestation_pool(&self, attestations: Vec<Attestation>) -> Result<()>;

    /// Replace the stored validator queue snapshot.
    async fn save_validator_queue(&self, queue: ValidatorQueue) -> Result<()>;
}

/// Reconciliation view of a stored epoch, as returned by
/// [`EpochStore::blocks_in_range`].
pub(crate) fn pending_and_proposed(data: &EpochData) -> impl Iterator<Item = MinimalBlock> + '_ {
    data.minimal_blocks().filter(|block| {
        data.blocks
            .get(&block.slot)
            .is_some_and(|container| container.status != containers::BlockStatus::Missed)
    })
}
