use crate::{
    Attestation, AttesterSlashing, Bytes, Deposit, ProposerSlashing, SignedVoluntaryExit, Slot,
    ValidatorIndex, serde_utils::quoted_u64,
};
use serde::{Deserialize, Serialize};

/// Link between the beacon chain and the eth1 deposit contract.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Eth1Data {
    pub deposit_root: Bytes,
    #[serde(with = "quoted_u64")]
    pub deposit_count: u64,
    pub block_hash: Bytes,
}

/// The body of a beacon block.
///
/// `eth1_data` is optional on the wire because nodes omit it for genesis
/// blocks. The `Default` body always carries a present, empty `Eth1Data`, so
/// every block built locally has a concrete value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeaconBlockBody {
    #[serde(default)]
    pub randao_reveal: Bytes,
    pub eth1_data: Option<Eth1Data>,
    #[serde(default)]
    pub graffiti: Bytes,
    #[serde(default)]
    pub proposer_slashings: Vec<ProposerSlashing>,
    #[serde(default)]
    pub attester_slashings: Vec<AttesterSlashing>,
    #[serde(default)]
    pub attestations: Vec<Attestation>,
    #[serde(default)]
    pub deposits: Vec<Deposit>,
    #[serde(default)]
    pub voluntary_exits: Vec<SignedVoluntaryExit>,
}

impl Default for BeaconBlockBody {
    fn default() -> Self {
        Self {
            randao_reveal: Bytes::default(),
            eth1_data: Some(Eth1Data::default()),
            graffiti: Bytes::default(),
            proposer_slashings: Vec::new(),
            attester_slashings: Vec::new(),
            attestations: Vec::new(),
            deposits: Vec::new(),
            voluntary_exits: Vec::new(),
        }
    }
}

impl BeaconBlockBody {
    /// Replace a missing `eth1_data` with an explicit empty one.
    pub fn ensure_eth1_data(&mut self) -> &Eth1Data {
        self.eth1_data.get_or_insert_with(Eth1Data::default)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeaconBlock {
    #[serde(with = "quoted_u64")]
    pub slot: Slot,
    #[serde(default, with = "quoted_u64")]
    pub proposer_index: ValidatorIndex,
    #[serde(default)]
    pub parent_root: Bytes,
    #[serde(default)]
    pub state_root: Bytes,
    pub body: BeaconBlockBody,
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignedBeaconBlock {
    pub block: BeaconBlock,
    #[serde(default)]
    pub signature: Bytes,
}

/// A block together with its root, as listed by the node.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeaconBlockContainer {
    pub block: SignedBeaconBlock,
    pub block_root: Bytes,
}

impl BeaconBlockContainer {
    /// Stand-in for a slot the node has no block for.
    ///
    /// Every byte field is empty, every list is empty and the body carries an
    /// empty `Eth1Data`. `block_root` is one of the status sentinels.
    pub fn placeholder(slot: Slot, block_root: Bytes) -> Self {
        Self {
            block: SignedBeaconBlock {
                block: BeaconBlock {
                    slot,
                    ..BeaconBlock::default()
                },
                signature: Bytes::default(),
            },
            block_root,
        }
    }

    pub fn slot(&self) -> Slot {
        self.block.block.slot
    }

    pub fn body(&self) -> &BeaconBlockBody {
        &self.block.block.body
    }

    pub fn body_mut(&mut self) -> &mut BeaconBlockBody {
        &mut self.block.block.body
    }
}
