pub mod backfill_sync;
pub mod block_status;
/// Sync core of the exporter.
///
/// Keeps the store consistent with the node, one epoch at a time:
///
/// - **Chain Head Tracker**: reads the node's head and finalized epochs
/// - **Reconciler**: diffs stored blocks against the node and finds gaps
/// - **Epoch Exporter**: builds and persists the full dataset of one epoch
/// - **Block Status Deriver**: scheduled or missed, for slots without a block
/// - **Status Updater**: refreshes finalization of recent epochs
/// - **Pool Exporter**: snapshots the attestation pool and validator queue
/// - **Backfill Sync**: exports every epoch concurrently at startup
/// - **Sync Service**: drives all of the above on an interval
///
/// ## State Machine
///
/// - **IDLE**: not started
/// - **BACKFILLING**: exporting genesis to head, failures left to reconciliation
/// - **STEADY**: reconciliation cycles, any failure ends the loop
pub mod config;
pub mod epoch_export;
pub mod head;
pub mod pools;
pub mod reconciler;
pub mod service;
pub mod states;
pub mod status_updater;

pub use backfill_sync::{BackfillReport, BackfillSync};
pub use block_status::{BlockStatusDeriver, MISSED_BLOCK_ROOT, SCHEDULED_BLOCK_ROOT};
pub use config::*;
pub use epoch_export::EpochExporter;
pub use head::ChainHeadTracker;
pub use pools::PoolExporter;
pub use reconciler::Reconciler;
pub use service::{CycleReport, SyncService};
pub use states::SyncState;
pub use status_updater::StatusUpdater;

#[cfg(test)]
mod tests;
