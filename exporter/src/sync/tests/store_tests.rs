use containers::{BlockStatus, Bytes, MinimalBlock};
use pretty_assertions::assert_eq;

use super::common::*;
use crate::store::{EpochStore, MemoryStore};

#[tokio::test]
async fn test_blocks_in_range_skips_missed_placeholders() {
    let store = MemoryStore::new();
    store
        .save_epoch(stored_epoch(
            1,
            &[
                (4, BlockStatus::Proposed, 0xa4),
                (5, BlockStatus::Missed, 0x01),
                (6, BlockStatus::Scheduled, 0x00),
            ],
        ))
        .await
        .unwrap();
    store
        .save_epoch(stored_epoch(3, &[(12, BlockStatus::Proposed, 0xac)]))
        .await
        .unwrap();

    let slots = store
        .blocks_in_range(0, 2)
        .await
        .unwrap()
        .into_iter()
        .map(|block| block.slot)
        .collect::<Vec<_>>();

    assert_eq!(slots, vec![4, 6]);
    assert!(store.blocks_in_range(3, 1).await.unwrap().is_empty());
    assert_eq!(
        store.blocks_in_range(3, 3).await.unwrap(),
        vec![MinimalBlock {
            epoch: 3,
            slot: 12,
            block_root: Bytes(vec![0xac]),
        }]
    );
}

#[tokio::test]
async fn test_status_update_only_touches_finalized_flag() {
    let store = MemoryStore::new();
    let saved = stored_epoch(2, &[(8, BlockStatus::Proposed, 0xa8)]);
    store.save_epoch(saved.clone()).await.unwrap();

    let mut update = participation(2, true);
    update.participation.voted_ether = 1;
    store.update_epoch_status(&update).await.unwrap();
    store.update_epoch_status(&participation(7, true)).await.unwrap();

    let stored = store.epoch(2).unwrap();
    assert!(stored.participation.finalized);
    assert_eq!(stored.participation.participation, saved.participation.participation);
    assert_eq!(stored.blocks, saved.blocks);
    assert_eq!(store.stored_epochs().await.unwrap(), vec![2]);
}
