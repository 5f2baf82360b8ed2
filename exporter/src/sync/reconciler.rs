//! Decides which epochs need (re-)exporting.
//!
//! Three independent checks feed the export set:
//!
//! - **Block diff**: stored and node-reported blocks of the window between
//!   the finalized and head epochs are paired by slot. A slot present on
//!   only one side, or present on both with different roots, queues its
//!   epoch.
//! - **Gap scan**: epochs missing between two stored epochs are queued.
//! - **Backfill scan**: epochs after the newest stored epoch up to head are
//!   queued, as is the genesis epoch if it was never stored.
//!
//! Nothing here writes to the store.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chain::config::GENESIS_EPOCH;
use containers::{BlockComparisonContainer, ChainHead, Epoch, MinimalBlock};
use tracing::{Instrument, Span, debug, info, info_span};

use crate::error::ExportError;
use crate::node::BeaconNode;
use crate::pagination::fetch_all;
use crate::store::EpochStore;

/// Pair stored and node-reported blocks by slot, in slot order.
pub fn pair_blocks(
    db_blocks: impl IntoIterator<Item = MinimalBlock>,
    node_blocks: impl IntoIterator<Item = MinimalBlock>,
) -> Vec<BlockComparisonContainer> {
    let mut pairs = BTreeMap::<_, BlockComparisonContainer>::new();

    for block in db_blocks {
        let entry = pairs
            .entry(block.slot)
            .or_insert_with(|| unpaired(block.epoch));
        entry.db = Some(block);
    }

    for block in node_blocks {
        let entry = pairs
            .entry(block.slot)
            .or_insert_with(|| unpaired(block.epoch));
        entry.node = Some(block);
    }

    pairs.into_values().collect()
}

fn unpaired(epoch: Epoch) -> BlockComparisonContainer {
    BlockComparisonContainer {
        epoch,
        db: None,
        node: None,
    }
}

/// Epochs with a slot missing on either side or with differing roots.
pub fn mismatched_epochs(pairs: &[BlockComparisonContainer]) -> BTreeSet<Epoch> {
    let mut epochs = BTreeSet::new();

    for pair in pairs {
        let reason = match (&pair.db, &pair.node) {
            (None, Some(_)) => "on node, missing in db",
            (Some(_), None) => "on db, missing on node",
            (Some(db), Some(node)) if db.block_root != node.block_root => "hash mismatch",
            _ => continue,
        };

        let slot = pair.db.as_ref().or(pair.node.as_ref()).map(|block| block.slot);

        debug!(epoch = pair.epoch, slot, reason, "Queueing epoch");

        epochs.insert(pair.epoch);
    }

    epochs
}

/// Epochs strictly between consecutive entries of ascending `stored`.
pub fn gap_epochs(stored: &[Epoch]) -> BTreeSet<Epoch> {
    stored
        .windows(2)
        .flat_map(|pair| pair[0].saturating_add(1)..pair[1])
        .collect()
}

/// Epochs never exported: those after the newest stored epoch through
/// `head`, plus genesis when it is absent.
pub fn unexported_epochs(stored: &[Epoch], head: Epoch) -> BTreeSet<Epoch> {
    let Some(newest) = stored.last() else {
        return (GENESIS_EPOCH..=head).collect();
    };

    let mut epochs = BTreeSet::new();

    if *newest < head {
        epochs.extend(newest + 1..=head);
    }

    if !stored.contains(&GENESIS_EPOCH) {
        epochs.insert(GENESIS_EPOCH);
    }

    epochs
}

pub struct Reconciler<N, S> {
    node: Arc<N>,
    store: Arc<S>,
    page_size: u32,
    span: Span,
}

impl<N: BeaconNode, S: EpochStore> Reconciler<N, S> {
    pub fn new(node: Arc<N>, store: Arc<S>, page_size: u32, span: Span) -> Self {
        Self {
            node,
            store,
            page_size,
            span,
        }
    }

    /// Compute the deduplicated set of epochs to export for `head`.
    pub async fn export_set(&self, head: &ChainHead) -> Result<BTreeSet<Epoch>, ExportError> {
        let span = info_span!(
            parent: &self.span,
            "reconcile",
            head_epoch = head.head_epoch,
            finalized_epoch = head.finalized_epoch
        );

        async move {
            let start = head.finalized_epoch;
            let end = head.head_epoch;

            let db_blocks = self
                .store
                .blocks_in_range(start, end)
                .await
                .map_err(|source| ExportError::Query {
                    what: "blocks",
                    source,
                })?;

            let mut node_blocks = Vec::new();

            for epoch in start..=end {
                let blocks = fetch_all(self.page_size, |request| {
                    self.node.list_blocks(epoch, request)
                })
                .await
                .map_err(|partial| ExportError::Blocks {
                    epoch,
                    source: partial.into_error(),
                })?;

                node_blocks.extend(blocks.into_iter().map(|block| MinimalBlock {
                    epoch,
                    slot: block.slot(),
                    block_root: block.block_root,
                }));
            }

            let stored = self
                .store
                .stored_epochs()
                .await
                .map_err(|source| ExportError::Query {
                    what: "epochs",
                    source,
                })?;

            let mismatched = mismatched_epochs(&pair_blocks(db_blocks, node_blocks));
            let gaps = gap_epochs(&stored);
            let unexported = unexported_epochs(&stored, end);

            info!(
                mismatched = mismatched.len(),
                gaps = gaps.len(),
                unexported = unexported.len(),
                "Reconciled stored epochs against node"
            );

            let mut export_set = mismatched;
            export_set.extend(gaps);
            export_set.extend(unexported);

            Ok(export_set)
        }
        .instrument(span)
        .await
    }
}
