/// Sync loop state machine.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    /// Not started yet.
    #[default]
    Idle,

    /// Exporting every epoch from genesis to head with a bounded worker group.
    ///
    /// Only entered when a full index on startup is configured. Export
    /// failures here are logged and left to reconciliation.
    Backfilling,

    /// Running reconciliation cycles on a fixed interval.
    ///
    /// Any error in a cycle ends the loop.
    Steady,
}

impl SyncState {
    /// Check if a transition to the target state is valid.
    pub fn can_transition_to(&self, target: SyncState) -> bool {
        match self {
            SyncState::Idle => matches!(target, SyncState::Backfilling | SyncState::Steady),
            SyncState::Backfilling => matches!(target, SyncState::Steady),
            SyncState::Steady => false,
        }
    }
}
