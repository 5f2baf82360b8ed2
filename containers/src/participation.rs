use crate::{Epoch, Gwei, serde_utils::quoted_u64};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorParticipation {
    #[serde(default)]
    pub global_participation_rate: f32,
    #[serde(default, with = "quoted_u64")]
    pub voted_ether: Gwei,
    #[serde(default, with = "quoted_u64")]
    pub eligible_ether: Gwei,
}

/// Participation and finalization status of one epoch.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpochParticipation {
    #[serde(with = "quoted_u64")]
    pub epoch: Epoch,
    pub finalized: bool,
    #[serde(default)]
    pub participation: ValidatorParticipation,
}

impl EpochParticipation {
    /// Value stored when the node cannot report participation for `epoch`.
    ///
    /// The epoch is assumed finalized with zero participation so that status
    /// tracking always has a row to update.
    pub fn assumed_finalized(epoch: Epoch) -> Self {
        Self {
            epoch,
            finalized: true,
            participation: ValidatorParticipation::default(),
        }
    }
}
