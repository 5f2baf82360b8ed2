use crate::{Bytes, Epoch, Slot, serde_utils::quoted_u64};
use serde::{Deserialize, Serialize};

/// The node's view of the chain tip and finality.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainHead {
    #[serde(with = "quoted_u64")]
    pub head_slot: Slot,
    #[serde(with = "quoted_u64")]
    pub head_epoch: Epoch,
    #[serde(default)]
    pub head_block_root: Bytes,
    #[serde(with = "quoted_u64")]
    pub finalized_epoch: Epoch,
    #[serde(default)]
    pub finalized_block_root: Bytes,
    #[serde(default, with = "quoted_u64")]
    pub justified_epoch: Epoch,
}

impl ChainHead {
    pub fn new(head_epoch: Epoch, finalized_epoch: Epoch) -> Self {
        Self {
            head_epoch,
            finalized_epoch,
            ..Self::default()
        }
    }
}
