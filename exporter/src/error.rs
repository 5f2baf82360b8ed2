use anyhow::Error as AnyhowError;
use containers::Epoch;
use thiserror::Error;

/// Errors that abort an export operation.
///
/// In the steady-state loop every variant is fatal. During backfill, epoch
/// export errors are logged and the epoch is left to the next reconciliation.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to retrieve chain head: {source:#}")]
    ChainHead { source: AnyhowError },
    #[error("failed to retrieve assignments for epoch {epoch}: {source:#}")]
    Assignments { epoch: Epoch, source: AnyhowError },
    #[error("failed to retrieve blocks for epoch {epoch}: {source:#}")]
    Blocks { epoch: Epoch, source: AnyhowError },
    #[error("failed to save epoch {epoch}: {source:#}")]
    SaveEpoch { epoch: Epoch, source: AnyhowError },
    #[error("failed to update status of epoch {epoch}: {source:#}")]
    UpdateEpochStatus { epoch: Epoch, source: AnyhowError },
    #[error("failed to query stored {what}: {source:#}")]
    Query {
        what: &'static str,
        source: AnyhowError,
    },
    #[error("failed to retrieve {snapshot} snapshot: {source:#}")]
    FetchSnapshot {
        snapshot: &'static str,
        source: AnyhowError,
    },
    #[error("failed to save {snapshot} snapshot: {source:#}")]
    SaveSnapshot {
        snapshot: &'static str,
        source: AnyhowError,
    },
}

impl ExportError {
    /// Epoch the failed operation was working on, if any.
    pub fn epoch(&self) -> Option<Epoch> {
        match self {
            Self::Assignments { epoch, .. }
            | Self::Blocks { epoch, .. }
            | Self::SaveEpoch { epoch, .. }
            | Self::UpdateEpochStatus { epoch, .. } => Some(*epoch),
            Self::ChainHead { .. }
            | Self::Query { .. }
            | Self::FetchSnapshot { .. }
            | Self::SaveSnapshot { .. } => None,
        }
    }
}
