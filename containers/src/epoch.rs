use crate::{
    BeaconBlockContainer, BeaconCommittee, Bytes, CommitteeIndex, Epoch, EpochParticipation, Slot,
    Validator, ValidatorAssignment, ValidatorBalance, ValidatorIndex,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Proposal status of a slot. Persisted as its numeric code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum BlockStatus {
    /// A proposer is assigned and the slot is still within its grace window.
    Scheduled = 0,
    /// The node reports a block for the slot.
    Proposed = 1,
    /// The slot passed its grace window without a block.
    Missed = 2,
}

impl BlockStatus {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(BlockStatus::Scheduled),
            1 => Some(BlockStatus::Proposed),
            2 => Some(BlockStatus::Missed),
            _ => None,
        }
    }
}

impl From<BlockStatus> for u8 {
    fn from(status: BlockStatus) -> Self {
        status.code()
    }
}

impl TryFrom<u8> for BlockStatus {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| format!("unknown block status code {code}"))
    }
}

/// One slot's block state within an exported epoch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockContainer {
    pub status: BlockStatus,
    pub proposer: ValidatorIndex,
    pub block: BeaconBlockContainer,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttesterAssignment {
    pub slot: Slot,
    pub committee_index: CommitteeIndex,
    pub member_index: u64,
    pub validator_index: ValidatorIndex,
}

/// Proposer and attester schedule of one epoch.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorAssignments {
    pub proposer_assignments: BTreeMap<Slot, ValidatorIndex>,
    pub attester_assignments: Vec<AttesterAssignment>,
}

impl ValidatorAssignments {
    /// Build the epoch schedule from per-validator duties.
    ///
    /// A validator's position inside its committee is taken from the order of
    /// `beacon_committees`; validators absent from their own committee list
    /// are skipped for attester duties.
    pub fn from_duties<'a>(duties: impl IntoIterator<Item = &'a ValidatorAssignment>) -> Self {
        let mut assignments = Self::default();

        for duty in duties {
            for slot in &duty.proposer_slots {
                assignments
                    .proposer_assignments
                    .insert(*slot, duty.validator_index);
            }

            if let Some(member_index) = duty
                .beacon_committees
                .iter()
                .position(|index| *index == duty.validator_index)
            {
                assignments.attester_assignments.push(AttesterAssignment {
                    slot: duty.attester_slot,
                    committee_index: duty.committee_index,
                    member_index: member_index as u64,
                    validator_index: duty.validator_index,
                });
            }
        }

        assignments.attester_assignments.sort_by_key(|assignment| {
            (
                assignment.slot,
                assignment.committee_index,
                assignment.member_index,
            )
        });

        assignments
    }

    pub fn proposer(&self, slot: Slot) -> Option<ValidatorIndex> {
        self.proposer_assignments.get(&slot).copied()
    }
}

/// Everything exported for a single epoch, persisted as one unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpochData {
    pub epoch: Epoch,
    pub blocks: BTreeMap<Slot, BlockContainer>,
    pub validator_assignments: ValidatorAssignments,
    pub validators: Vec<Validator>,
    pub beacon_committees: Vec<BeaconCommittee>,
    pub validator_balances: Vec<ValidatorBalance>,
    pub participation: EpochParticipation,
}

impl EpochData {
    /// Reconciliation view of the blocks, in slot order.
    pub fn minimal_blocks(&self) -> impl Iterator<Item = MinimalBlock> + '_ {
        self.blocks.iter().map(|(slot, container)| MinimalBlock {
            epoch: self.epoch,
            slot: *slot,
            block_root: container.block.block_root.clone(),
        })
    }
}

/// Slot and root of a block, used only to diff stored blocks against the node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MinimalBlock {
    pub epoch: Epoch,
    pub slot: Slot,
    pub block_root: Bytes,
}

/// Stored and node-reported versions of one slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockComparisonContainer {
    pub epoch: Epoch,
    pub db: Option<MinimalBlock>,
    pub node: Option<MinimalBlock>,
}
