use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use containers::{Epoch, ValidatorAssignments};
use parking_lot::Mutex;
use tracing::debug;

use crate::node::BeaconNode;
use crate::pagination::fetch_all;

/// Epochs kept by [`NodeAssignmentCache`] unless configured otherwise.
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

/// Proposer and attester schedule per epoch.
#[async_trait]
pub trait AssignmentCache: Send + Sync {
    async fn epoch_assignments(&self, epoch: Epoch) -> Result<ValidatorAssignments>;
}

/// [`AssignmentCache`] filled from the node's validator assignment listing.
///
/// The oldest epoch is evicted once `capacity` epochs are cached. Concurrent
/// misses for the same epoch may both hit the node; the second insert wins.
pub struct NodeAssignmentCache<N> {
    node: Arc<N>,
    page_size: u32,
    capacity: usize,
    cache: Mutex<BTreeMap<Epoch, ValidatorAssignments>>,
}

impl<N: BeaconNode> NodeAssignmentCache<N> {
    pub fn new(node: Arc<N>, page_size: u32, capacity: usize) -> Self {
        Self {
            node,
            page_size,
            capacity: capacity.max(1),
            cache: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn cached_epochs(&self) -> Vec<Epoch> {
        self.cache.lock().keys().copied().collect()
    }

    fn insert(&self, epoch: Epoch, assignments: ValidatorAssignments) {
        let mut cache = self.cache.lock();

        cache.insert(epoch, assignments);

        while cache.len() > self.capacity {
            cache.pop_first();
        }
    }
}

#[async_trait]
impl<N: BeaconNode> AssignmentCache for NodeAssignmentCache<N> {
    async fn epoch_assignments(&self, epoch: Epoch) -> Result<ValidatorAssignments> {
        if let Some(assignments) = self.cache.lock().get(&epoch) {
            return Ok(assignments.clone());
        }

        let duties = fetch_all(self.page_size, |request| {
            self.node.list_validator_assignments(epoch, request)
        })
        .await
        .map_err(|partial| partial.into_error())?;

        let assignments = ValidatorAssignments::from_duties(&duties);

        debug!(
            epoch,
            duties = duties.len(),
            proposers = assignments.proposer_assignments.len(),
            "Computed validator assignments"
        );

        self.insert(epoch, assignments.clone());

        Ok(assignments)
    }
}
