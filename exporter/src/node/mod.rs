pub mod http;

use anyhow::Result;
use async_trait::async_trait;
use containers::{
    Attestation, BeaconBlockContainer, BeaconCommittee, ChainHead, Epoch, EpochParticipation, Page,
    PageRequest, Validator, ValidatorAssignment, ValidatorBalance, ValidatorQueue,
};

pub use http::{HttpBeaconNode, NodeApiError};

/// Read access to a beacon node.
///
/// Every listing is filtered by epoch and paginated; see
/// [`crate::pagination::fetch_all`] for how pages are walked.
#[async_trait]
pub trait BeaconNode: Send + Sync {
    async fn chain_head(&self) -> Result<ChainHead>;

    async fn list_blocks(
        &self,
        epoch: Epoch,
        request: PageRequest,
    ) -> Result<Page<BeaconBlockContainer>>;

    async fn list_validators(&self, epoch: Epoch, request: PageRequest) -> Result<Page<Validator>>;

    async fn list_beacon_committees(
        &self,
        epoch: Epoch,
        request: PageRequest,
    ) -> Result<Page<BeaconCommittee>>;

    async fn list_validator_balances(
        &self,
        epoch: Epoch,
        request: PageRequest,
    ) -> Result<Page<ValidatorBalance>>;

    async fn list_validator_assignments(
        &self,
        epoch: Epoch,
        request: PageRequest,
    ) -> Result<Page<ValidatorAssignment>>;

    async fn validator_participation(&self, epoch: Epoch) -> Result<EpochParticipation>;

    async fn attestation_pool(&self) -> Result<Vec<Attestation>>;

    async fn validator_queue(&self) -> Result<ValidatorQueue>;
}
