//! Startup backfill: export every epoch from genesis to head.
//!
//! Exports run concurrently on a `JoinSet`, bounded by a semaphore. An
//! epoch that fails is logged and reported, never retried here: the next
//! reconciliation cycle finds it through the gap and backfill scans.
use std::collections::HashMap;
use std::sync::Arc;

use chain::config::GENESIS_EPOCH;
use containers::Epoch;
use metrics::Metrics;
use tokio::sync::Semaphore;
use tokio::task::{Id, JoinError, JoinSet};
use tracing::{Instrument, Span, info, info_span, warn};

use super::epoch_export::EpochExporter;
use crate::assignments::AssignmentCache;
use crate::error::ExportError;
use crate::node::BeaconNode;
use crate::store::EpochStore;

const PHASE: &str = "backfill";

/// Outcome of a backfill run, epochs in ascending order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BackfillReport {
    pub exported: Vec<Epoch>,
    pub failed: Vec<Epoch>,
}

pub struct BackfillSync<N, S, A> {
    exporter: Arc<EpochExporter<N, S, A>>,
    concurrency: usize,
    metrics: Option<Arc<Metrics>>,
    span: Span,
}

impl<N, S, A> BackfillSync<N, S, A>
where
    N: BeaconNode + 'static,
    S: EpochStore + 'static,
    A: AssignmentCache + 'static,
{
    pub fn new(
        exporter: Arc<EpochExporter<N, S, A>>,
        concurrency: usize,
        metrics: Option<Arc<Metrics>>,
        span: Span,
    ) -> Self {
        Self {
            exporter,
            concurrency: concurrency.max(1),
            metrics,
            span,
        }
    }

    /// Export epochs `0..=head_epoch`. Never fails as a whole.
    pub async fn backfill(&self, head_epoch: Epoch) -> BackfillReport {
        let span = info_span!(parent: &self.span, "backfill", head_epoch);

        async move {
            info!(
                head_epoch,
                concurrency = self.concurrency,
                "Starting backfill"
            );

            let semaphore = Arc::new(Semaphore::new(self.concurrency));
            let mut tasks = JoinSet::new();
            let mut report = BackfillReport::default();
            let mut task_epochs = HashMap::new();

            for epoch in GENESIS_EPOCH..=head_epoch {
                // The semaphore is never closed.
                let Ok(permit) = semaphore.clone().acquire_owned().await else {
                    break;
                };

                while let Some(joined) = tasks.try_join_next() {
                    self.record(&mut report, &mut task_epochs, joined);
                }

                let exporter = self.exporter.clone();

                let handle = tasks.spawn(
                    async move {
                        let result = exporter.export_epoch(epoch).await;
                        drop(permit);
                        (epoch, result)
                    }
                    .in_current_span(),
                );

                task_epochs.insert(handle.id(), epoch);
            }

            while let Some(joined) = tasks.join_next().await {
                self.record(&mut report, &mut task_epochs, joined);
            }

            report.exported.sort_unstable();
            report.failed.sort_unstable();

            info!(
                exported = report.exported.len(),
                failed = report.failed.len(),
                "Backfill finished"
            );

            report
        }
        .instrument(span)
        .await
    }

    fn record(
        &self,
        report: &mut BackfillReport,
        task_epochs: &mut HashMap<Id, Epoch>,
        joined: Result<(Epoch, Result<(), ExportError>), JoinError>,
    ) {
        let (epoch, result) = match joined {
            Ok((epoch, result)) => {
                task_epochs.retain(|_, pending| *pending != epoch);
                (epoch, result)
            }
            Err(error) => {
                let Some(epoch) = task_epochs.remove(&error.id()) else {
                    warn!(%error, "Backfill export task of unknown epoch did not complete");
                    return;
                };

                warn!(epoch, %error, "Backfill export task did not complete");

                if let Some(metrics) = &self.metrics {
                    metrics.inc_epoch_export_failures(PHASE);
                }

                report.failed.push(epoch);
                return;
            }
        };

        match result {
            Ok(()) => {
                if let Some(metrics) = &self.metrics {
                    metrics.inc_epochs_exported(PHASE);
                }

                report.exported.push(epoch);
            }
            Err(error) => {
                warn!(epoch, %error, "Backfill export failed, leaving epoch to reconciliation");

                if let Some(metrics) = &self.metrics {
                    metrics.inc_epoch_export_failures(PHASE);
                }

                report.failed.push(epoch);
            }
        }
    }
}
