use crate::{
    serde_utils::{quoted_u64, quoted_u64_vec},
    Bytes, Checkpoint, CommitteeIndex, Slot, ValidatorIndex,
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationData {
    #[serde(with = "quoted_u64")]
    pub slot: Slot,
    #[serde(with = "quoted_u64")]
    pub committee_index: CommitteeIndex,
    pub beacon_block_root: Bytes,
    pub source: Checkpoint,
    pub target: Checkpoint,
}

/// Aggregated attestation as carried in block bodies and the attestation pool.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attestation {
    pub aggregation_bits: Bytes,
    pub data: AttestationData,
    pub signature: Bytes,
}

/// Attestation with explicit attester indices, used by attester slashings.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedAttestation {
    #[serde(with = "quoted_u64_vec")]
    pub attesting_indices: Vec<ValidatorIndex>,
    pub data: AttestationData,
    pub signature: Bytes,
}
