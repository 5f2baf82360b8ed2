pub mod assignments;
pub mod error;
pub mod node;
pub mod pagination;
pub mod store;
pub mod sync;

pub use assignments::{AssignmentCache, NodeAssignmentCache};
pub use error::ExportError;
pub use node::{BeaconNode, HttpBeaconNode};
pub use store::{EpochStore, FileStore, MemoryStore};
pub use sync::{SyncConfig, SyncService, SyncState};
