pub mod attestation;
pub mod block;
pub mod checkpoint;
pub mod committee;
pub mod epoch;
pub mod operations;
pub mod page;
pub mod participation;
pub mod serde_utils;
pub mod status;
pub mod types;
pub mod validator;

pub use attestation::{Attestation, AttestationData, IndexedAttestation};
pub use block::{BeaconBlock, BeaconBlockBody, BeaconBlockContainer, Eth1Data, SignedBeaconBlock};
pub use checkpoint::Checkpoint;
pub use committee::BeaconCommittee;
pub use epoch::{
    AttesterAssignment, BlockComparisonContainer, BlockContainer, BlockStatus, EpochData,
    MinimalBlock, ValidatorAssignments,
};
pub use operations::{
    AttesterSlashing, BeaconBlockHeader, Deposit, DepositData, ProposerSlashing,
    SignedBeaconBlockHeader, SignedVoluntaryExit, VoluntaryExit,
};
pub use page::{Page, PageRequest};
pub use participation::{EpochParticipation, ValidatorParticipation};
pub use status::ChainHead;
pub use types::{Bytes, CommitteeIndex, Epoch, Gwei, Slot, ValidatorIndex};
pub use validator::{Validator, ValidatorAssignment, ValidatorBalance, ValidatorQueue};
