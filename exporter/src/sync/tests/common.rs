use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chain::ChainConfig;
use containers::{
    Attestation, BeaconBlock, BeaconBlockContainer, BeaconCommittee, BlockContainer, BlockStatus,
    Bytes, ChainHead, Epoch, EpochData, EpochParticipation, MinimalBlock, Page, PageRequest,
    SignedBeaconBlock, Slot, Validator, ValidatorAssignment, ValidatorAssignments, ValidatorBalance,
    ValidatorIndex, ValidatorParticipation, ValidatorQueue,
};
use parking_lot::Mutex;
use tracing::Span;

use crate::assignments::NodeAssignmentCache;
use crate::node::BeaconNode;
use crate::store::{EpochStore, MemoryStore};
use crate::sync::{EpochExporter, SyncConfig};

/// Four 12-second slots per epoch, genesis at the Unix epoch.
pub const TEST_CHAIN: ChainConfig = ChainConfig {
    genesis_time: 0,
    seconds_per_slot: 12,
    slots_per_epoch: 4,
};

pub type TestExporter = EpochExporter<MockNode, MemoryStore, NodeAssignmentCache<MockNode>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Call {
    ChainHead,
    Blocks,
    Validators,
    Committees,
    Balances,
    Assignments,
    Participation,
    AttestationPool,
    ValidatorQueue,
}

/// In-memory beacon node.
///
/// Listings are served in pages using the item offset as continuation
/// token. A call registered with [`MockNode::fail`] errors once the given
/// number of pages has been served.
#[derive(Default)]
pub struct MockNode {
    head: Mutex<ChainHead>,
    blocks: Mutex<BTreeMap<Epoch, Vec<BeaconBlockContainer>>>,
    duties: Mutex<BTreeMap<Epoch, Vec<ValidatorAssignment>>>,
    validators: Mutex<Vec<Validator>>,
    committees: Mutex<Vec<BeaconCommittee>>,
    balances: Mutex<Vec<ValidatorBalance>>,
    participation: Mutex<BTreeMap<Epoch, EpochParticipation>>,
    attestation_pool: Mutex<Vec<Attestation>>,
    validator_queue: Mutex<ValidatorQueue>,
    failures: Mutex<HashMap<(Call, Option<Epoch>), usize>>,
    calls: Mutex<Vec<(Call, Option<Epoch>)>>,
    yield_in_blocks: AtomicBool,
    blocks_in_flight: AtomicUsize,
    max_blocks_in_flight: AtomicUsize,
    panic_epoch: Mutex<Option<Epoch>>,
}

impl MockNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_head(&self, head_epoch: Epoch, finalized_epoch: Epoch) {
        *self.head.lock() = ChainHead::new(head_epoch, finalized_epoch);
    }

    pub fn add_block(&self, epoch: Epoch, block: BeaconBlockContainer) {
        self.blocks.lock().entry(epoch).or_default().push(block);
    }

    pub fn set_blocks(&self, epoch: Epoch, blocks: Vec<BeaconBlockContainer>) {
        self.blocks.lock().insert(epoch, blocks);
    }

    pub fn add_duty(&self, epoch: Epoch, duty: ValidatorAssignment) {
        self.duties.lock().entry(epoch).or_default().push(duty);
    }

    pub fn set_validators(&self, validators: Vec<Validator>) {
        *self.validators.lock() = validators;
    }

    pub fn set_committees(&self, committees: Vec<BeaconCommittee>) {
        *self.committees.lock() = committees;
    }

    pub fn set_balances(&self, balances: Vec<ValidatorBalance>) {
        *self.balances.lock() = balances;
    }

    pub fn set_participation(&self, participation: EpochParticipation) {
        self.participation
            .lock()
            .insert(participation.epoch, participation);
    }

    pub fn set_attestation_pool(&self, attestations: Vec<Attestation>) {
        *self.attestation_pool.lock() = attestations;
    }

    pub fn set_validator_queue(&self, queue: ValidatorQueue) {
        *self.validator_queue.lock() = queue;
    }

    /// Make `call` fail for every epoch after `pages_served` successful pages.
    pub fn fail(&self, call: Call, pages_served: usize) {
        self.failures.lock().insert((call, None), pages_served);
    }

    /// Make `call` fail for `epoch` only.
    pub fn fail_epoch(&self, call: Call, epoch: Epoch, pages_served: usize) {
        self.failures
            .lock()
            .insert((call, Some(epoch)), pages_served);
    }

    pub fn recover(&self, call: Call) {
        self.failures.lock().retain(|(failing, _), _| *failing != call);
    }

    /// Make block listings yield to the scheduler while counted as in flight.
    pub fn yield_in_block_listings(&self) {
        self.yield_in_blocks.store(true, Ordering::SeqCst);
    }

    /// Most block listings ever observed running at once.
    pub fn max_blocks_in_flight(&self) -> usize {
        self.max_blocks_in_flight.load(Ordering::SeqCst)
    }

    /// Make the block listing of `epoch` panic.
    pub fn panic_on_blocks(&self, epoch: Epoch) {
        *self.panic_epoch.lock() = Some(epoch);
    }

    pub fn calls_to(&self, call: Call) -> Vec<Option<Epoch>> {
        self.calls
            .lock()
            .iter()
            .filter(|(made, _)| *made == call)
            .map(|(_, epoch)| *epoch)
            .collect()
    }

    fn record(&self, call: Call, epoch: Option<Epoch>, page: usize) -> Result<()> {
        self.calls.lock().push((call, epoch));

        let failures = self.failures.lock();
        let pages_served = failures
            .get(&(call, None))
            .or_else(|| epoch.and_then(|epoch| failures.get(&(call, Some(epoch)))));

        match pages_served {
            Some(pages_served) if page >= *pages_served => {
                Err(anyhow!("{call:?} unavailable (page {page})"))
            }
            _ => Ok(()),
        }
    }

    fn single(&self, call: Call, epoch: Option<Epoch>) -> Result<()> {
        self.record(call, epoch, 0)
    }

    fn list<T: Clone>(
        &self,
        call: Call,
        epoch: Epoch,
        items: &[T],
        request: &PageRequest,
    ) -> Result<Page<T>> {
        let page_size = request.page_size.max(1) as usize;
        let offset = request.page_token.parse::<usize>().unwrap_or(0);

        self.record(call, Some(epoch), offset / page_size)?;

        if items.is_empty() {
            return Ok(Page::empty());
        }

        let end = (offset + page_size).min(items.len());
        let next_page_token = if end < items.len() {
            end.to_string()
        } else {
            String::new()
        };

        Ok(Page {
            items: items.get(offset..end).unwrap_or_default().to_vec(),
            next_page_token,
            total_size: items.len() as u64,
        })
    }
}

#[async_trait]
impl BeaconNode for MockNode {
    async fn chain_head(&self) -> Result<ChainHead> {
        self.single(Call::ChainHead, None)?;
        Ok(self.head.lock().clone())
    }

    async fn list_blocks(
        &self,
        epoch: Epoch,
        request: PageRequest,
    ) -> Result<Page<BeaconBlockContainer>> {
        if *self.panic_epoch.lock() == Some(epoch) {
            panic!("block listing of epoch {epoch} panicked");
        }

        if self.yield_in_blocks.load(Ordering::SeqCst) {
            let in_flight = self.blocks_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_blocks_in_flight.fetch_max(in_flight, Ordering::SeqCst);

            for _ in 0..4 {
                tokio::task::yield_now().await;
            }

            self.blocks_in_flight.fetch_sub(1, Ordering::SeqCst);
        }

        let blocks = self.blocks.lock().get(&epoch).cloned().unwrap_or_default();
        self.list(Call::Blocks, epoch, &blocks, &request)
    }

    async fn list_validators(&self, epoch: Epoch, request: PageRequest) -> Result<Page<Validator>> {
        let validators = self.validators.lock().clone();
        self.list(Call::Validators, epoch, &validators, &request)
    }

    async fn list_beacon_committees(
        &self,
        epoch: Epoch,
        request: PageRequest,
    ) -> Result<Page<BeaconCommittee>> {
        let committees = self.committees.lock().clone();
        self.list(Call::Committees, epoch, &committees, &request)
    }

    async fn list_validator_balances(
        &self,
        epoch: Epoch,
        request: PageRequest,
    ) -> Result<Page<ValidatorBalance>> {
        let balances = self.balances.lock().clone();
        self.list(Call::Balances, epoch, &balances, &request)
    }

    async fn list_validator_assignments(
        &self,
        epoch: Epoch,
        request: PageRequest,
    ) -> Result<Page<ValidatorAssignment>> {
        let duties = self.duties.lock().get(&epoch).cloned().unwrap_or_default();
        self.list(Call::Assignments, epoch, &duties, &request)
    }

    async fn validator_participation(&self, epoch: Epoch) -> Result<EpochParticipation> {
        self.single(Call::Participation, Some(epoch))?;

        self.participation
            .lock()
            .get(&epoch)
            .cloned()
            .ok_or_else(|| anyhow!("no participation for epoch {epoch}"))
    }

    async fn attestation_pool(&self) -> Result<Vec<Attestation>> {
        self.single(Call::AttestationPool, None)?;
        Ok(self.attestation_pool.lock().clone())
    }

    async fn validator_queue(&self) -> Result<ValidatorQueue> {
        self.single(Call::ValidatorQueue, None)?;
        Ok(self.validator_queue.lock().clone())
    }
}

pub fn test_config() -> SyncConfig {
    SyncConfig {
        page_size: 2,
        backfill_concurrency: 3,
        ..SyncConfig::default()
    }
}

pub fn exporter(node: &Arc<MockNode>, store: &Arc<MemoryStore>) -> TestExporter {
    let config = test_config();

    EpochExporter::new(
        node.clone(),
        store.clone(),
        Arc::new(NodeAssignmentCache::new(node.clone(), config.page_size, 16)),
        TEST_CHAIN,
        &config,
        None,
        Span::none(),
    )
}

pub fn block(slot: Slot, root: u8, proposer_index: ValidatorIndex) -> BeaconBlockContainer {
    BeaconBlockContainer {
        block: SignedBeaconBlock {
            block: BeaconBlock {
                slot,
                proposer_index,
                parent_root: Bytes(vec![0xee]),
                state_root: Bytes(vec![0xdd]),
                ..BeaconBlock::default()
            },
            signature: Bytes(vec![0xcc]),
        },
        block_root: Bytes(vec![root]),
    }
}

pub fn proposer_duty(
    validator_index: ValidatorIndex,
    proposer_slots: Vec<Slot>,
) -> ValidatorAssignment {
    ValidatorAssignment {
        validator_index,
        proposer_slots,
        ..ValidatorAssignment::default()
    }
}

/// Assign every slot of `epoch` to validator `slot + 100`.
pub fn assign_all_slots(node: &MockNode, epoch: Epoch) {
    for slot in TEST_CHAIN.slots_in_epoch(epoch) {
        node.add_duty(epoch, proposer_duty(slot + 100, vec![slot]));
    }
}

pub fn participation(epoch: Epoch, finalized: bool) -> EpochParticipation {
    EpochParticipation {
        epoch,
        finalized,
        participation: ValidatorParticipation {
            global_participation_rate: 0.75,
            voted_ether: 96,
            eligible_ether: 128,
        },
    }
}

/// Wall-clock time `seconds` after genesis.
pub fn at(seconds: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(seconds)
}

pub fn validator(index: u8) -> Validator {
    Validator {
        public_key: Bytes(vec![index]),
        effective_balance: 32_000_000_000,
        ..Validator::default()
    }
}

/// Stored epoch with the given `(slot, status, root)` blocks.
pub fn stored_epoch(epoch: Epoch, blocks: &[(Slot, BlockStatus, u8)]) -> EpochData {
    EpochData {
        epoch,
        blocks: blocks
            .iter()
            .map(|(slot, status, root)| {
                (
                    *slot,
                    BlockContainer {
                        status: *status,
                        proposer: slot + 100,
                        block: block(*slot, *root, slot + 100),
                    },
                )
            })
            .collect(),
        validator_assignments: ValidatorAssignments::default(),
        validators: Vec::new(),
        beacon_committees: Vec::new(),
        validator_balances: Vec::new(),
        participation: participation(epoch, false),
    }
}

/// Store whose writes always fail. Reads see an empty store.
pub struct FailingStore;

#[async_trait]
impl EpochStore for FailingStore {
    async fn save_epoch(&self, data: EpochData) -> Result<()> {
        Err(anyhow!("disk full while saving epoch {}", data.epoch))
    }

    async fn update_epoch_status(&self, participation: &EpochParticipation) -> Result<()> {
        Err(anyhow!("disk full while updating epoch {}", participation.epoch))
    }

    async fn blocks_in_range(&self, _start: Epoch, _end: Epoch) -> Result<Vec<MinimalBlock>> {
        Ok(Vec::new())
    }

    async fn stored_epochs(&self) -> Result<Vec<Epoch>> {
        Ok(Vec::new())
    }

    async fn save_attestation_pool(&self, _attestations: Vec<Attestation>) -> Result<()> {
        Err(anyhow!("disk full while saving attestation pool"))
    }

    async fn save_validator_queue(&self, _queue: ValidatorQueue) -> Result<()> {
        Err(anyhow!("disk full while saving validator queue"))
    }
}
