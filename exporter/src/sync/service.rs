use std::collections::BTreeSet;
use std::sync::Arc;

use chain::ChainConfig;
use containers::Epoch;
use metrics::Metrics;
use tokio::time::{self, MissedTickBehavior};
use tracing::{Instrument, Span, debug, error, info, info_span, warn};

use super::{
    backfill_sync::{BackfillReport, BackfillSync},
    config::SyncConfig,
    epoch_export::EpochExporter,
    head::ChainHeadTracker,
    pools::PoolExporter,
    reconciler::Reconciler,
    states::SyncState,
    status_updater::StatusUpdater,
};
use crate::assignments::AssignmentCache;
use crate::error::ExportError;
use crate::node::BeaconNode;
use crate::store::EpochStore;

const PHASE: &str = "steady";

/// What one steady-state cycle did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub head_epoch: Epoch,
    pub finalized_epoch: Epoch,
    /// Epochs exported, in the order they were exported.
    pub exported: Vec<Epoch>,
    pub statuses_updated: usize,
}

/// Sync service coordinating all export operations.
///
/// Runs an optional backfill, then reconciliation cycles on a fixed
/// interval until a cycle fails:
/// 1. Fetch the chain head
/// 2. Compute the export set with the reconciler
/// 3. Export each epoch of the set in ascending order
/// 4. Refresh the status of recent epochs
/// 5. Replace the attestation pool and validator queue snapshots
pub struct SyncService<N, S, A> {
    state: SyncState,
    config: SyncConfig,
    head_tracker: ChainHeadTracker<N>,
    reconciler: Reconciler<N, S>,
    exporter: Arc<EpochExporter<N, S, A>>,
    backfill_sync: BackfillSync<N, S, A>,
    status_updater: StatusUpdater<N, S>,
    pools: PoolExporter<N, S>,
    metrics: Option<Arc<Metrics>>,
    span: Span,
}

impl<N, S, A> SyncService<N, S, A>
where
    N: BeaconNode + 'static,
    S: EpochStore + 'static,
    A: AssignmentCache + 'static,
{
    pub fn new(
        node: Arc<N>,
        store: Arc<S>,
        assignments: Arc<A>,
        chain: ChainConfig,
        config: SyncConfig,
        metrics: Option<Arc<Metrics>>,
        span: Span,
    ) -> Self {
        let exporter = Arc::new(EpochExporter::new(
            node.clone(),
            store.clone(),
            assignments,
            chain,
            &config,
            metrics.clone(),
            span.clone(),
        ));

        Self {
            state: SyncState::default(),
            head_tracker: ChainHeadTracker::new(node.clone(), metrics.clone(), span.clone()),
            reconciler: Reconciler::new(
                node.clone(),
                store.clone(),
                config.page_size,
                span.clone(),
            ),
            backfill_sync: BackfillSync::new(
                exporter.clone(),
                config.backfill_concurrency,
                metrics.clone(),
                span.clone(),
            ),
            exporter,
            status_updater: StatusUpdater::new(
                node.clone(),
                store.clone(),
                config.status_lookback_epochs,
                span.clone(),
            ),
            pools: PoolExporter::new(node, store, metrics.clone(), span.clone()),
            config,
            metrics,
            span,
        }
    }

    /// Get current sync state.
    pub fn state(&self) -> SyncState {
        self.state
    }

    fn transition(&mut self, target: SyncState) {
        if !self.state.can_transition_to(target) {
            warn!(from = ?self.state, to = ?target, "Ignoring invalid sync state transition");
            return;
        }

        info!(from = ?self.state, to = ?target, "Sync state transition");
        self.state = target;
    }

    /// Export every epoch up to the current head.
    ///
    /// Only the head fetch can fail; failed epoch exports are in the report.
    pub async fn backfill(&mut self) -> Result<BackfillReport, ExportError> {
        let head = self.head_tracker.chain_head().await?;

        self.transition(SyncState::Backfilling);

        Ok(self.backfill_sync.backfill(head.head_epoch).await)
    }

    /// Run one reconciliation cycle. Any error is fatal to the loop.
    pub async fn run_cycle(&self) -> Result<CycleReport, ExportError> {
        let span = info_span!(parent: &self.span, "sync_cycle");

        async move {
            let result = self.cycle().await;

            if let Err(error) = &result {
                error!(epoch = error.epoch(), %error, "Sync cycle failed");
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn cycle(&self) -> Result<CycleReport, ExportError> {
        let head = self.head_tracker.chain_head().await?;

        let export_set: BTreeSet<Epoch> = self.reconciler.export_set(&head).await?;

        if let Some(metrics) = &self.metrics {
            metrics.set_export_set_size(export_set.len());
        }

        let mut exported = Vec::with_capacity(export_set.len());

        for epoch in export_set {
            if let Err(error) = self.exporter.export_epoch(epoch).await {
                if let Some(metrics) = &self.metrics {
                    metrics.inc_epoch_export_failures(PHASE);
                }

                return Err(error);
            }

            if let Some(metrics) = &self.metrics {
                metrics.inc_epochs_exported(PHASE);
            }

            exported.push(epoch);
        }

        let statuses_updated = self.status_updater.update(&head).await?;

        self.pools.export_attestation_pool().await?;
        self.pools.export_validator_queue().await?;

        debug!(
            head_epoch = head.head_epoch,
            exported = exported.len(),
            statuses_updated,
            "Sync cycle complete"
        );

        Ok(CycleReport {
            head_epoch: head.head_epoch,
            finalized_epoch: head.finalized_epoch,
            exported,
            statuses_updated,
        })
    }

    /// Backfill if configured, then cycle until a cycle fails.
    pub async fn run(&mut self) -> Result<(), ExportError> {
        if self.config.full_index_on_startup {
            let report = self.backfill().await?;

            if !report.failed.is_empty() {
                warn!(
                    failed = report.failed.len(),
                    "Backfill left epochs for reconciliation"
                );
            }
        }

        self.transition(SyncState::Steady);

        let mut interval = time::interval(self.config.sync_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            self.run_cycle().await?;
        }
    }
}
