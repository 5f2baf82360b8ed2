use std::sync::Arc;
use std::time::Duration;

use containers::{Attestation, BlockStatus, ValidatorQueue};
use pretty_assertions::assert_eq;
use tracing::Span;

use super::common::*;
use crate::assignments::NodeAssignmentCache;
use crate::error::ExportError;
use crate::store::{EpochStore, MemoryStore};
use crate::sync::{SyncConfig, SyncService, SyncState};

type TestService = SyncService<MockNode, MemoryStore, NodeAssignmentCache<MockNode>>;

fn service(node: &Arc<MockNode>, store: &Arc<MemoryStore>, config: SyncConfig) -> TestService {
    SyncService::new(
        node.clone(),
        store.clone(),
        Arc::new(NodeAssignmentCache::new(node.clone(), config.page_size, 16)),
        TEST_CHAIN,
        config,
        None,
        Span::none(),
    )
}

/// Node at head `head`, every slot assigned, participation everywhere.
fn populated_node(head: u64, finalized: u64) -> Arc<MockNode> {
    let node = Arc::new(MockNode::new());
    node.set_head(head, finalized);

    for epoch in 0..=head {
        assign_all_slots(&node, epoch);
        node.set_participation(participation(epoch, epoch <= finalized));
    }

    node.set_attestation_pool(vec![Attestation::default(); 2]);
    node.set_validator_queue(ValidatorQueue {
        churn_limit: 4,
        ..ValidatorQueue::default()
    });

    node
}

#[tokio::test]
async fn test_sync_service_creation() {
    let node = Arc::new(MockNode::new());
    let store = Arc::new(MemoryStore::new());

    assert_eq!(service(&node, &store, test_config()).state(), SyncState::Idle);
}

#[tokio::test]
async fn test_cycle_exports_unexported_epochs() {
    let node = populated_node(2, 0);
    node.set_blocks(1, vec![block(5, 0xaa, 105)]);
    let store = Arc::new(MemoryStore::new());

    let report = service(&node, &store, test_config())
        .run_cycle()
        .await
        .unwrap();

    assert_eq!(report.head_epoch, 2);
    assert_eq!(report.finalized_epoch, 0);
    assert_eq!(report.exported, vec![0, 1, 2]);
    assert_eq!(report.statuses_updated, 3);
    assert_eq!(store.stored_epochs().await.unwrap(), vec![0, 1, 2]);
    assert_eq!(store.epoch(1).unwrap().blocks[&5].status, BlockStatus::Proposed);
    assert_eq!(store.attestation_pool().len(), 2);
    assert_eq!(store.validator_queue().unwrap().churn_limit, 4);
}

#[tokio::test]
async fn test_second_cycle_only_exports_new_epochs() {
    let node = populated_node(2, 0);
    node.set_blocks(1, vec![block(5, 0xaa, 105)]);
    let store = Arc::new(MemoryStore::new());
    let service = service(&node, &store, test_config());

    service.run_cycle().await.unwrap();
    assert!(service.run_cycle().await.unwrap().exported.is_empty());

    node.set_head(3, 1);
    assign_all_slots(&node, 3);
    node.add_block(1, block(6, 0xbb, 106));

    // Epoch 1 now differs from the node and epoch 3 is new.
    assert_eq!(service.run_cycle().await.unwrap().exported, vec![1, 3]);
    assert_eq!(store.epoch(1).unwrap().blocks[&6].status, BlockStatus::Proposed);
}

#[tokio::test]
async fn test_cycle_fails_on_head_error() {
    let node = populated_node(2, 0);
    node.fail(Call::ChainHead, 0);
    let store = Arc::new(MemoryStore::new());

    let error = service(&node, &store, test_config())
        .run_cycle()
        .await
        .unwrap_err();

    assert!(matches!(error, ExportError::ChainHead { .. }));
    assert!(store.stored_epochs().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_cycle_fails_on_export_error() {
    let node = populated_node(3, 0);
    node.fail_epoch(Call::Assignments, 2, 0);
    let store = Arc::new(MemoryStore::new());

    let error = service(&node, &store, test_config())
        .run_cycle()
        .await
        .unwrap_err();

    assert!(matches!(error, ExportError::Assignments { epoch: 2, .. }));
    // Ascending order: epochs before the failure were exported, none after.
    assert_eq!(store.stored_epochs().await.unwrap(), vec![0, 1]);
    assert!(node.calls_to(Call::AttestationPool).is_empty());
}

#[tokio::test]
async fn test_cycle_fails_on_pool_error() {
    let node = populated_node(1, 0);
    node.fail(Call::AttestationPool, 0);
    let store = Arc::new(MemoryStore::new());

    let error = service(&node, &store, test_config())
        .run_cycle()
        .await
        .unwrap_err();

    assert!(matches!(error, ExportError::FetchSnapshot { .. }));
    assert!(node.calls_to(Call::ValidatorQueue).is_empty());
}

#[tokio::test]
async fn test_backfill_failure_is_recovered_by_cycle() {
    let node = populated_node(5, 2);
    node.fail_epoch(Call::Blocks, 3, 0);
    let store = Arc::new(MemoryStore::new());
    let mut service = service(&node, &store, test_config());

    let report = service.backfill().await.unwrap();

    assert_eq!(service.state(), SyncState::Backfilling);
    assert_eq!(report.failed, vec![3]);
    assert_eq!(store.stored_epochs().await.unwrap(), vec![0, 1, 2, 4, 5]);

    node.recover(Call::Blocks);

    let cycle = service.run_cycle().await.unwrap();

    assert_eq!(cycle.exported, vec![3]);
    assert_eq!(store.stored_epochs().await.unwrap(), (0..=5).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_zero_interval_still_ticks() {
    let node = populated_node(1, 0);
    node.fail(Call::ValidatorQueue, 0);
    let store = Arc::new(MemoryStore::new());
    let config = SyncConfig {
        sync_interval_secs: 0,
        ..test_config()
    };
    assert_eq!(config.sync_interval(), Duration::from_secs(1));

    let error = service(&node, &store, config).run().await.unwrap_err();

    assert!(matches!(error, ExportError::FetchSnapshot { .. }));
    assert_eq!(store.stored_epochs().await.unwrap(), vec![0, 1]);
}

#[tokio::test]
async fn test_run_ends_on_fatal_error() {
    let node = populated_node(1, 0);
    node.fail(Call::ValidatorQueue, 0);
    let store = Arc::new(MemoryStore::new());
    let mut service = service(
        &node,
        &store,
        SyncConfig {
            full_index_on_startup: true,
            ..test_config()
        },
    );

    let error = service.run().await.unwrap_err();

    assert!(matches!(error, ExportError::FetchSnapshot { .. }));
    assert_eq!(service.state(), SyncState::Steady);
    assert_eq!(store.stored_epochs().await.unwrap(), vec![0, 1]);
}
