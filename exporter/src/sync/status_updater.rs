use std::ops::RangeInclusive;
use std::sync::Arc;

use containers::{ChainHead, Epoch};
use tracing::{Instrument, Span, debug, info_span, warn};

use crate::error::ExportError;
use crate::node::BeaconNode;
use crate::store::EpochStore;

/// Epochs whose status is refreshed for `head`.
pub fn status_window(head: &ChainHead, lookback: u64) -> RangeInclusive<Epoch> {
    head.finalized_epoch.saturating_sub(lookback)..=head.head_epoch
}

/// Refreshes the finalization status of recent epochs.
///
/// A participation fetch failure skips that epoch; a store failure aborts
/// the update.
pub struct StatusUpdater<N, S> {
    node: Arc<N>,
    store: Arc<S>,
    lookback: u64,
    span: Span,
}

impl<N: BeaconNode, S: EpochStore> StatusUpdater<N, S> {
    pub fn new(node: Arc<N>, store: Arc<S>, lookback: u64, span: Span) -> Self {
        Self {
            node,
            store,
            lookback,
            span,
        }
    }

    /// Returns the number of epochs updated.
    pub async fn update(&self, head: &ChainHead) -> Result<usize, ExportError> {
        let window = status_window(head, self.lookback);
        let span = info_span!(
            parent: &self.span,
            "update_status",
            start = window.start(),
            end = window.end()
        );

        async move {
            let mut updated = 0;

            for epoch in window {
                let participation = match self.node.validator_participation(epoch).await {
                    Ok(participation) => participation,
                    Err(error) => {
                        warn!(epoch, error = %format!("{error:#}"), "Skipping status update");
                        continue;
                    }
                };

                self.store
                    .update_epoch_status(&participation)
                    .await
                    .map_err(|source| ExportError::UpdateEpochStatus { epoch, source })?;

                updated += 1;
            }

            debug!(updated, "Updated epoch statuses");

            Ok(updated)
        }
        .instrument(span)
        .await
    }
}
