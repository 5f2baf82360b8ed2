use std::sync::Arc;

use containers::ChainHead;
use metrics::Metrics;
use tracing::{Instrument, Span, debug};

use crate::error::ExportError;
use crate::node::BeaconNode;

/// Reads the node's head and finalized epochs.
pub struct ChainHeadTracker<N> {
    node: Arc<N>,
    metrics: Option<Arc<Metrics>>,
    span: Span,
}

impl<N: BeaconNode> ChainHeadTracker<N> {
    pub fn new(node: Arc<N>, metrics: Option<Arc<Metrics>>, span: Span) -> Self {
        Self {
            node,
            metrics,
            span,
        }
    }

    pub async fn chain_head(&self) -> Result<ChainHead, ExportError> {
        let head = self
            .node
            .chain_head()
            .instrument(self.span.clone())
            .await
            .map_err(|source| ExportError::ChainHead { source })?;

        self.span.in_scope(|| {
            debug!(
                head_epoch = head.head_epoch,
                finalized_epoch = head.finalized_epoch,
                "Fetched chain head"
            )
        });

        if let Some(metrics) = &self.metrics {
            metrics.set_chain_head(head.head_epoch, head.finalized_epoch);
        }

        Ok(head)
    }
}
