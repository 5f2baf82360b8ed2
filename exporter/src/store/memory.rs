use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use containers::{Attestation, Epoch, EpochData, EpochParticipation, MinimalBlock, ValidatorQueue};
use parking_lot::RwLock;

use super::{EpochStore, pending_and_proposed};

/// Store kept entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    epochs: RwLock<BTreeMap<Epoch, EpochData>>,
    attestation_pool: RwLock<Vec<Attestation>>,
    validator_queue: RwLock<Option<ValidatorQueue>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn epoch(&self, epoch: Epoch) -> Option<EpochData> {
        self.epochs.read().get(&epoch).cloned()
    }

    pub fn attestation_pool(&self) -> Vec<Attestation> {
        self.attestation_pool.read().clone()
    }

    pub fn validator_queue(&self) -> Option<ValidatorQueue> {
        self.validator_queue.read().clone()
    }
}

#[async_trait]
impl EpochStore for MemoryStore {
    async fn save_epoch(&self, data: EpochData) -> Result<()> {
        self.epochs.write().insert(data.epoch, data);
        Ok(())
    }

    async fn update_epoch_status(&self, participation: &EpochParticipation) -> Result<()> {
        if let Some(data) = self.epochs.write().get_mut(&participation.epoch) {
            data.participation.finalized = participation.finalized;
        }
        Ok(())
    }

    async fn blocks_in_range(&self, start: Epoch, end: Epoch) -> Result<Vec<MinimalBlock>> {
        if start > end {
            return Ok(Vec::new());
        }

        let epochs = self.epochs.read();
        Ok(epochs
            .range(start..=end)
            .flat_map(|(_, data)| pending_and_proposed(data))
            .collect())
    }

    async fn stored_epochs(&self) -> Result<Vec<Epoch>> {
        Ok(self.epochs.read().keys().copied().collect())
    }

    async fn save_attestation_pool(&self, attestations: Vec<Attestation>) -> Result<()> {
        *self.attestation_pool.write() = attestations;
        Ok(())
    }

    async fn save_validator_queue(&self, queue: ValidatorQueue) -> Result<()> {
        *self.validator_queue.write() = Some(queue);
        Ok(())
    }
}
