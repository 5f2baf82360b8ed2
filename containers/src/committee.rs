use crate::{
    serde_utils::{quoted_u64, quoted_u64_vec},
    CommitteeIndex, Slot, ValidatorIndex,
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeaconCommittee {
    #[serde(with = "quoted_u64")]
    pub slot: Slot,
    #[serde(with = "quoted_u64")]
    pub committee_index: CommitteeIndex,
    #[serde(with = "quoted_u64_vec")]
    pub validator_indices: Vec<ValidatorIndex>,
}
