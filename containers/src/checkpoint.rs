use crate::{Bytes, Epoch, serde_utils::quoted_u64};
use serde::{Deserialize, Serialize};

/// Epoch boundary block referenced by attestations as source or target.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Checkpoint {
    #[serde(with = "quoted_u64")]
    pub epoch: Epoch,
    pub root: Bytes,
}
