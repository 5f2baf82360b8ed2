use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::SystemTime;

use chain::{ChainConfig, config::GENESIS_EPOCH};
use containers::{
    BeaconBlockContainer, BlockContainer, BlockStatus, Epoch, EpochData, EpochParticipation, Page,
    PageRequest, Slot, ValidatorAssignments,
};
use metrics::Metrics;
use tracing::{Instrument, Span, debug, info, info_span, warn};

use super::block_status::BlockStatusDeriver;
use super::config::SyncConfig;
use crate::assignments::AssignmentCache;
use crate::error::ExportError;
use crate::node::BeaconNode;
use crate::pagination::fetch_all;
use crate::store::EpochStore;

const VALIDATORS: &str = "validators";
const COMMITTEES: &str = "beacon_committees";
const BALANCES: &str = "validator_balances";

/// Builds the full dataset of one epoch from the node and persists it.
///
/// Assignments and blocks are required. Validators, committees and balances
/// are kept partial when their listing fails, and participation falls back
/// to [`EpochParticipation::assumed_finalized`].
pub struct EpochExporter<N, S, A> {
    node: Arc<N>,
    store: Arc<S>,
    assignments: Arc<A>,
    chain: ChainConfig,
    status_deriver: BlockStatusDeriver,
    page_size: u32,
    metrics: Option<Arc<Metrics>>,
    span: Span,
}

impl<N, S, A> EpochExporter<N, S, A>
where
    N: BeaconNode,
    S: EpochStore,
    A: AssignmentCache,
{
    pub fn new(
        node: Arc<N>,
        store: Arc<S>,
        assignments: Arc<A>,
        chain: ChainConfig,
        config: &SyncConfig,
        metrics: Option<Arc<Metrics>>,
        span: Span,
    ) -> Self {
        Self {
            node,
            store,
            assignments,
            chain,
            status_deriver: BlockStatusDeriver::new(chain, config.missed_slot_grace()),
            page_size: config.page_size,
            metrics,
            span,
        }
    }

    pub async fn export_epoch(&self, epoch: Epoch) -> Result<(), ExportError> {
        self.export_epoch_at(epoch, SystemTime::now()).await
    }

    /// Export `epoch`, deriving placeholder statuses as of `now`.
    pub async fn export_epoch_at(&self, epoch: Epoch, now: SystemTime) -> Result<(), ExportError> {
        let span = info_span!(parent: &self.span, "export_epoch", epoch);

        async move {
            let _timer = self
                .metrics
                .as_ref()
                .map(|metrics| metrics.start_epoch_export_timer());

            let data = self.build_epoch(epoch, now).await?;
            let blocks = data.blocks.len();
            let validators = data.validators.len();

            self.store
                .save_epoch(data)
                .await
                .map_err(|source| ExportError::SaveEpoch { epoch, source })?;

            info!(epoch, blocks, validators, "Exported epoch");

            Ok(())
        }
        .instrument(span)
        .await
    }

    /// Assemble the dataset of `epoch` without persisting it.
    pub async fn build_epoch(
        &self,
        epoch: Epoch,
        now: SystemTime,
    ) -> Result<EpochData, ExportError> {
        let assignments = self
            .assignments
            .epoch_assignments(epoch)
            .await
            .map_err(|source| ExportError::Assignments { epoch, source })?;

        let node_blocks = fetch_all(self.page_size, |request| {
            self.node.list_blocks(epoch, request)
        })
        .await
        .map_err(|partial| ExportError::Blocks {
            epoch,
            source: partial.into_error(),
        })?;

        let mut blocks = self.proposed_blocks(epoch, node_blocks, &assignments);

        let validators = self
            .fetch_recoverable(epoch, VALIDATORS, |request| {
                self.node.list_validators(epoch, request)
            })
            .await;

        self.fill_unproposed_slots(epoch, &mut blocks, &assignments, now);

        let beacon_committees = self
            .fetch_recoverable(epoch, COMMITTEES, |request| {
                self.node.list_beacon_committees(epoch, request)
            })
            .await;

        let validator_balances = self
            .fetch_recoverable(epoch, BALANCES, |request| {
                self.node.list_validator_balances(epoch, request)
            })
            .await;

        let participation = match self.node.validator_participation(epoch).await {
            Ok(participation) => participation,
            Err(error) => {
                warn!(
                    epoch,
                    error = %format!("{error:#}"),
                    "Participation unavailable, storing epoch as finalized with zero participation"
                );

                if let Some(metrics) = &self.metrics {
                    metrics.inc_substituted_participation();
                }

                EpochParticipation::assumed_finalized(epoch)
            }
        };

        Ok(EpochData {
            epoch,
            blocks,
            validator_assignments: assignments,
            validators,
            beacon_committees,
            validator_balances,
            participation,
        })
    }

    fn proposed_blocks(
        &self,
        epoch: Epoch,
        node_blocks: Vec<BeaconBlockContainer>,
        assignments: &ValidatorAssignments,
    ) -> BTreeMap<Slot, BlockContainer> {
        let mut blocks = BTreeMap::new();

        for mut block in node_blocks {
            let slot = block.slot();

            if epoch == GENESIS_EPOCH {
                block.body_mut().ensure_eth1_data();
            }

            let proposer = assignments
                .proposer(slot)
                .unwrap_or(block.block.block.proposer_index);

            let container = BlockContainer {
                status: BlockStatus::Proposed,
                proposer,
                block,
            };

            if let Some(replaced) = blocks.insert(slot, container) {
                let kept = &blocks[&slot].block.block_root;

                if replaced.block.block_root != *kept {
                    warn!(
                        epoch,
                        slot,
                        replaced_root = %replaced.block.block_root,
                        kept_root = %kept,
                        "Node reported several blocks for one slot, keeping the last"
                    );

                    if let Some(metrics) = &self.metrics {
                        metrics.inc_equivocations();
                    }
                }
            }
        }

        blocks
    }

    fn fill_unproposed_slots(
        &self,
        epoch: Epoch,
        blocks: &mut BTreeMap<Slot, BlockContainer>,
        assignments: &ValidatorAssignments,
        now: SystemTime,
    ) {
        let epoch_slots = self.chain.slots_in_epoch(epoch);

        for (slot, proposer) in &assignments.proposer_assignments {
            if !epoch_slots.contains(slot) {
                debug!(slot, "Ignoring proposer assignment outside the epoch");
                continue;
            }

            if let Some(container) = blocks.get_mut(slot) {
                container.proposer = *proposer;
                continue;
            }

            let (status, block_root) = self.status_deriver.derive(*slot, now);

            debug!(slot, ?status, "No block reported for assigned slot");

            blocks.insert(
                *slot,
                BlockContainer {
                    status,
                    proposer: *proposer,
                    block: BeaconBlockContainer::placeholder(*slot, block_root),
                },
            );
        }
    }

    async fn fetch_recoverable<T, F, Fut>(
        &self,
        epoch: Epoch,
        resource: &'static str,
        fetch_page: F,
    ) -> Vec<T>
    where
        F: FnMut(PageRequest) -> Fut,
        Fut: Future<Output = anyhow::Result<Page<T>>>,
    {
        match fetch_all(self.page_size, fetch_page).await {
            Ok(items) => items,
            Err(partial) => {
                warn!(
                    epoch,
                    resource,
                    fetched = partial.items.len(),
                    error = %format!("{:#}", partial.error),
                    "Listing failed, keeping partial result"
                );

                if let Some(metrics) = &self.metrics {
                    metrics.inc_partial_fetches(resource);
                }

                partial.items
            }
        }
    }
}
