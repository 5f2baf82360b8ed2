use std::sync::Arc;

use metrics::Metrics;
use tracing::{Instrument, Span, debug, info_span};

use crate::error::ExportError;
use crate::node::BeaconNode;
use crate::store::EpochStore;

const ATTESTATION_POOL: &str = "attestation pool";
const VALIDATOR_QUEUE: &str = "validator queue";

/// Copies the node's attestation pool and validator queue to the store,
/// replacing the previous snapshots.
pub struct PoolExporter<N, S> {
    node: Arc<N>,
    store: Arc<S>,
    metrics: Option<Arc<Metrics>>,
    span: Span,
}

impl<N: BeaconNode, S: EpochStore> PoolExporter<N, S> {
    pub fn new(node: Arc<N>, store: Arc<S>, metrics: Option<Arc<Metrics>>, span: Span) -> Self {
        Self {
            node,
            store,
            metrics,
            span,
        }
    }

    pub async fn export_attestation_pool(&self) -> Result<(), ExportError> {
        let span = info_span!(parent: &self.span, "export_attestation_pool");

        async move {
            let attestations =
                self.node
                    .attestation_pool()
                    .await
                    .map_err(|source| ExportError::FetchSnapshot {
                        snapshot: ATTESTATION_POOL,
                        source,
                    })?;

            let count = attestations.len();

            self.store
                .save_attestation_pool(attestations)
                .await
                .map_err(|source| ExportError::SaveSnapshot {
                    snapshot: ATTESTATION_POOL,
                    source,
                })?;

            if let Some(metrics) = &self.metrics {
                metrics.set_attestation_pool_size(count);
            }

            debug!(count, "Saved attestation pool");

            Ok(())
        }
        .instrument(span)
        .await
    }

    pub async fn export_validator_queue(&self) -> Result<(), ExportError> {
        let span = info_span!(parent: &self.span, "export_validator_queue");

        async move {
            let queue = self
                .node
                .validator_queue()
                .await
                .map_err(|source| ExportError::FetchSnapshot {
                    snapshot: VALIDATOR_QUEUE,
                    source,
                })?;

            let activations = queue.activation_public_keys.len();
            let exits = queue.exit_public_keys.len();

            self.store
                .save_validator_queue(queue)
                .await
                .map_err(|source| ExportError::SaveSnapshot {
                    snapshot: VALIDATOR_QUEUE,
                    source,
                })?;

            if let Some(metrics) = &self.metrics {
                metrics.set_validator_queue_size(activations, exits);
            }

            debug!(activations, exits, "Saved validator queue");

            Ok(())
        }
        .instrument(span)
        .await
    }
}
