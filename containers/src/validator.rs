use crate::{
    serde_utils::{quoted_u64, quoted_u64_vec},
    Bytes, CommitteeIndex, Epoch, Gwei, Slot, ValidatorIndex,
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validator {
    pub public_key: Bytes,
    #[serde(default)]
    pub withdrawal_credentials: Bytes,
    #[serde(with = "quoted_u64")]
    pub effective_balance: Gwei,
    #[serde(default)]
    pub slashed: bool,
    #[serde(with = "quoted_u64")]
    pub activation_eligibility_epoch: Epoch,
    #[serde(with = "quoted_u64")]
    pub activation_epoch: Epoch,
    #[serde(with = "quoted_u64")]
    pub exit_epoch: Epoch,
    #[serde(with = "quoted_u64")]
    pub withdrawable_epoch: Epoch,
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorBalance {
    pub public_key: Bytes,
    #[serde(with = "quoted_u64")]
    pub index: ValidatorIndex,
    #[serde(with = "quoted_u64")]
    pub balance: Gwei,
}

/// Pending activations and exits, as one snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorQueue {
    #[serde(default, with = "quoted_u64")]
    pub churn_limit: u64,
    #[serde(default)]
    pub activation_public_keys: Vec<Bytes>,
    #[serde(default)]
    pub exit_public_keys: Vec<Bytes>,
}

/// One validator's duties for an epoch, as listed by the node.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorAssignment {
    #[serde(default, with = "quoted_u64_vec")]
    pub beacon_committees: Vec<ValidatorIndex>,
    #[serde(default, with = "quoted_u64")]
    pub committee_index: CommitteeIndex,
    #[serde(default, with = "quoted_u64")]
    pub attester_slot: Slot,
    #[serde(default, with = "quoted_u64_vec")]
    pub proposer_slots: Vec<Slot>,
    #[serde(default)]
    pub public_key: Bytes,
    #[serde(with = "quoted_u64")]
    pub validator_index: ValidatorIndex,
}
