use crate::{Bytes, Epoch, Gwei, IndexedAttestation, Slot, ValidatorIndex, serde_utils::quoted_u64};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeaconBlockHeader {
    #[serde(with = "quoted_u64")]
    pub slot: Slot,
    #[serde(with = "quoted_u64")]
    pub proposer_index: ValidatorIndex,
    pub parent_root: Bytes,
    pub state_root: Bytes,
    pub body_root: Bytes,
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignedBeaconBlockHeader {
    pub header: BeaconBlockHeader,
    pub signature: Bytes,
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposerSlashing {
    pub header_1: SignedBeaconBlockHeader,
    pub header_2: SignedBeaconBlockHeader,
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttesterSlashing {
    pub attestation_1: IndexedAttestation,
    pub attestation_2: IndexedAttestation,
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositData {
    pub public_key: Bytes,
    pub withdrawal_credentials: Bytes,
    #[serde(with = "quoted_u64")]
    pub amount: Gwei,
    pub signature: Bytes,
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Deposit {
    #[serde(default)]
    pub proof: Vec<Bytes>,
    pub data: DepositData,
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoluntaryExit {
    #[serde(with = "quoted_u64")]
    pub epoch: Epoch,
    #[serde(with = "quoted_u64")]
    pub validator_index: ValidatorIndex,
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignedVoluntaryExit {
    pub exit: VoluntaryExit,
    pub signature: Bytes,
}
