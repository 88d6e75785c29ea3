//! The consensus engine aggregate.
//!
//! `ConsensusEngine` owns all consensus state — roster, committees, history
//! chain, pending block, per-height finality records — and is the only
//! mutation path for any of it. There is no process-global instance; the
//! node runtime constructs one engine and injects it wherever needed.
//!
//! # Locking
//!
//! Two mutexes split the aggregate:
//!
//! - the core lock covers roster, committees, history, the pending block
//!   and reward bookkeeping;
//! - the finality lock covers only the per-height vote sets and commit
//!   records, so vote ingestion from the network path never waits on slow
//!   block-production work.
//!
//! Operations that need both always acquire core before finality.
//! `finalize_block` holds both across the quorum check, the state
//! transition and the reward payout: two racing finalizers cannot both
//! succeed, and rewards are paid at most once per height.

use {
    crate::{
        block::{Block, BlockHeader, HistoryProof},
        committee::{self, Committee},
        config::{ConsensusConfig, GenesisValidator},
        error::{AdmissionError, ConsensusError, FinalityError},
        proposer,
        roster::{SlashOutcome, ValidatorRoster},
        snapshot::EngineSnapshot,
        validator::{SlashReason, Validator},
    },
    log::*,
    serde::{Deserialize, Serialize},
    solana_hash::Hash,
    solana_keypair::Keypair,
    solana_pubkey::Pubkey,
    solana_signer::Signer,
    std::{
        collections::{BTreeMap, BTreeSet},
        sync::{Arc, Mutex, MutexGuard},
    },
    zen_history::{ChainError, HistorySequencer},
    zen_rewards::{distribute, EmissionSchedule, RemainderPolicy, RewardLedger, RewardRecord},
};

/// BFT quorum size for a roster of `n` validators: `floor(2n/3) + 1`,
/// tolerating up to `floor((n-1)/3)` Byzantine members.
pub fn quorum_size(roster_len: usize) -> usize {
    roster_len * 2 / 3 + 1
}

/// Per-height commit and vote record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalityRecord {
    /// Digest of the committed block, set by `commit_block`.
    block_digest: Option<Hash>,
    block_timestamp: i64,
    /// Unique voter identities. A set, so duplicate votes never inflate
    /// the tally.
    votes: BTreeSet<Pubkey>,
    finalized: bool,
    /// Tally at the moment of finalization.
    finalized_votes: usize,
    reward_total: u64,
}

impl FinalityRecord {
    fn new() -> Self {
        Self {
            block_digest: None,
            block_timestamp: 0,
            votes: BTreeSet::new(),
            finalized: false,
            finalized_votes: 0,
            reward_total: 0,
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn vote_count(&self) -> usize {
        self.votes.len()
    }
}

/// The result of a successful finalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedBlock {
    pub height: u64,
    pub block_digest: Hash,
    /// Roster votes counted toward the quorum.
    pub votes: usize,
    /// Total reward drawn from the emission schedule for this height.
    pub reward_total: u64,
}

/// A point-in-time view of the engine, for operators and RPC.
#[derive(Debug, Clone)]
pub struct ConsensusStatus {
    pub chain_id: String,
    pub current_height: u64,
    pub validators: usize,
    pub total_stake: u64,
    pub committees: usize,
    pub history_len: u64,
    pub last_finalized_height: Option<u64>,
    pub pending_height: Option<u64>,
    pub treasury_accrued: u64,
    pub burned: u64,
}

/// State behind the core lock.
struct EngineCore {
    roster: ValidatorRoster,
    committees: Vec<Committee>,
    history: HistorySequencer,
    current_height: u64,
    pending: Option<Block>,
    /// Digest of the last committed block; the next block's parent.
    last_block_digest: Hash,
    emission: Box<dyn EmissionSchedule>,
    ledger: RewardLedger,
    treasury_accrued: u64,
    burned: u64,
}

impl EngineCore {
    fn reshuffle(&mut self, shard_count: u32) {
        self.committees =
            committee::partition(&self.roster, shard_count, self.history.tail_index());
    }
}

/// The validator-side consensus engine.
pub struct ConsensusEngine {
    config: ConsensusConfig,
    signer: Arc<Keypair>,
    core: Mutex<EngineCore>,
    finality: Mutex<BTreeMap<u64, FinalityRecord>>,
}

impl ConsensusEngine {
    /// Build an engine from static configuration and the genesis roster.
    pub fn new(
        config: ConsensusConfig,
        signer: Arc<Keypair>,
        genesis_validators: Vec<GenesisValidator>,
        emission: Box<dyn EmissionSchedule>,
    ) -> Result<Self, ConsensusError> {
        config.validate()?;
        let history = HistorySequencer::new(&config.chain_id);
        let mut roster = ValidatorRoster::new(config.min_stake);
        for genesis in genesis_validators {
            roster.add(Validator::new(
                genesis.address,
                genesis.verification_key,
                genesis.stake,
            ))?;
        }
        let committees = committee::partition(&roster, config.shard_count, history.tail_index());
        let last_block_digest = history.genesis().digest;
        info!(
            "consensus engine initialized: chain={} validators={} shards={} block_time={}ms",
            config.chain_id,
            roster.len(),
            config.shard_count,
            config.block_time_ms,
        );
        Ok(Self {
            config,
            signer,
            core: Mutex::new(EngineCore {
                roster,
                committees,
                history,
                current_height: 0,
                pending: None,
                last_block_digest,
                emission,
                ledger: RewardLedger::new(),
                treasury_accrued: 0,
                burned: 0,
            }),
            finality: Mutex::new(BTreeMap::new()),
        })
    }

    /// Rebuild an engine from a persisted snapshot, resuming at the
    /// persisted height without re-deriving finalized state.
    pub fn restore(
        config: ConsensusConfig,
        signer: Arc<Keypair>,
        emission: Box<dyn EmissionSchedule>,
        snapshot: EngineSnapshot,
    ) -> Result<Self, ConsensusError> {
        config.validate()?;
        if snapshot.chain_id != config.chain_id {
            return Err(crate::config::ConfigError::ChainIdMismatch {
                snapshot: snapshot.chain_id,
                configured: config.chain_id,
            }
            .into());
        }
        let history = HistorySequencer::restore(snapshot.history)?;
        let roster = ValidatorRoster::from_validators(config.min_stake, snapshot.validators);
        info!(
            "consensus engine restored: chain={} height={} validators={}",
            config.chain_id,
            snapshot.current_height,
            roster.len(),
        );
        Ok(Self {
            config,
            signer,
            core: Mutex::new(EngineCore {
                roster,
                committees: snapshot.committees,
                history,
                current_height: snapshot.current_height,
                pending: None,
                last_block_digest: snapshot.last_block_digest,
                emission,
                ledger: RewardLedger::new(),
                treasury_accrued: snapshot.treasury_accrued,
                burned: snapshot.burned,
            }),
            finality: Mutex::new(snapshot.finality),
        })
    }

    // -- Roster management --

    /// Admit a validator and recompute the committees.
    pub fn add_validator(
        &self,
        address: Pubkey,
        verification_key: Vec<u8>,
        stake: u64,
    ) -> Result<(), AdmissionError> {
        let mut core = self.core();
        core.roster
            .add(Validator::new(address, verification_key, stake))?;
        core.reshuffle(self.config.shard_count);
        Ok(())
    }

    /// Remove a validator and recompute the committees.
    pub fn remove_validator(&self, address: &Pubkey) -> Result<(), AdmissionError> {
        let mut core = self.core();
        core.roster.remove(address)?;
        core.reshuffle(self.config.shard_count);
        Ok(())
    }

    /// Slash a validator. Eviction (stake falling below the minimum)
    /// recomputes the committees; a plain penalty does not change
    /// membership.
    pub fn slash_validator(
        &self,
        address: &Pubkey,
        reason: SlashReason,
        penalty: u64,
        timestamp: i64,
    ) -> Result<SlashOutcome, AdmissionError> {
        let mut core = self.core();
        let height = core.current_height;
        let outcome = core.roster.slash(address, reason, penalty, height, timestamp)?;
        if matches!(outcome, SlashOutcome::Evicted { .. }) {
            core.reshuffle(self.config.shard_count);
        }
        Ok(outcome)
    }

    // -- Block production --

    /// Produce the candidate block for `height`.
    ///
    /// Pulls the history entry (extending the chain by one step), selects
    /// the proposer, signs the proof, and sets the pending block. Calling
    /// again for the same height before commit returns the pending block
    /// unchanged; serializing height advancement is the caller's job.
    pub fn produce_block(
        &self,
        height: u64,
        timestamp: i64,
        payload_digest: Hash,
    ) -> Result<Block, ConsensusError> {
        let mut core = self.core();
        if let Some(pending) = core.pending.as_ref() {
            if pending.header.height == height {
                return Ok(pending.clone());
            }
        }
        let entry = core.history.entry_for(height, timestamp)?;
        let proposer = proposer::select_proposer(&core.roster, &entry)?;
        let header = BlockHeader {
            height,
            timestamp,
            previous_digest: core.last_block_digest,
            proposer,
        };
        let mut block = Block {
            header,
            payload_digest,
            proof: None,
        };
        let signature = self.signer.sign_message(block.digest().as_ref());
        block.proof = Some(HistoryProof {
            entry,
            proposer,
            signature,
            produced_at: timestamp,
        });
        core.roster.record_produced(&proposer, height);
        core.current_height = height;
        core.pending = Some(block.clone());
        info!("block produced at height {height} by {proposer}");
        Ok(block)
    }

    // -- Commit & finality --

    /// Commit a block: verify its history proof against the local chain and
    /// open the finality record for its height.
    pub fn commit_block(&self, block: &Block) -> Result<(), ConsensusError> {
        let mut core = self.core();
        let proof = block.proof()?;
        if proof.entry.index != block.header.height {
            return Err(ChainError::InvalidProof {
                reason: format!(
                    "proof entry index {} does not match block height {}",
                    proof.entry.index, block.header.height
                ),
            }
            .into());
        }
        if proof.proposer != block.header.proposer {
            return Err(ChainError::InvalidProof {
                reason: "proof proposer does not match block header".to_string(),
            }
            .into());
        }
        core.history.verify_link(&proof.entry)?;

        let digest = block.digest();
        core.last_block_digest = digest;

        let mut finality = self.finality();
        let record = finality
            .entry(block.header.height)
            .or_insert_with(FinalityRecord::new);
        record.block_digest = Some(digest);
        record.block_timestamp = block.header.timestamp;
        info!("block committed at height {} ({digest})", block.header.height);
        Ok(())
    }

    /// Record a finality vote for `height` from `voter`.
    ///
    /// Votes are deduplicated by identity; returns whether the vote was
    /// new. Only the finality lock is taken, so this never contends with
    /// block production. Roster membership is checked at finalization.
    pub fn record_finality_vote(&self, height: u64, voter: Pubkey) -> bool {
        let mut finality = self.finality();
        let record = finality.entry(height).or_insert_with(FinalityRecord::new);
        let fresh = record.votes.insert(voter);
        if fresh {
            debug!("finality vote for height {height} from {voter}");
        }
        fresh
    }

    /// Attempt to finalize the block at `height`.
    ///
    /// Requires `floor(2n/3) + 1` unique roster votes. On success the block
    /// is terminal: the reward is drawn and distributed exactly once, the
    /// closing history entry is confirmed, and later calls return the same
    /// result without paying again. Short tallies fail with the retryable
    /// `InsufficientSignatures`.
    pub fn finalize_block(&self, height: u64) -> Result<FinalizedBlock, ConsensusError> {
        let mut core = self.core();
        let mut finality = self.finality();
        let record = finality
            .get_mut(&height)
            .ok_or(ChainError::MissingProof)?;
        let block_digest = record.block_digest.ok_or(ChainError::MissingProof)?;

        if record.finalized {
            return Ok(FinalizedBlock {
                height,
                block_digest,
                votes: record.finalized_votes,
                reward_total: record.reward_total,
            });
        }

        let required = quorum_size(core.roster.len());
        let have = record
            .votes
            .iter()
            .copied()
            .filter(|voter| core.roster.contains(voter))
            .count();
        if have < required {
            return Err(FinalityError::InsufficientSignatures {
                have,
                need: required,
            }
            .into());
        }

        let reward_total = core.emission.reward_for_height(height)?;
        let stakes = core.roster.stakes();
        let distribution = distribute(reward_total, &stakes, self.config.remainder_policy);
        for (address, amount) in &distribution.shares {
            core.roster.credit_reward(address, *amount);
            core.ledger.record(height, *address, *amount);
        }
        match distribution.policy {
            RemainderPolicy::Treasury => {
                core.treasury_accrued = core.treasury_accrued.saturating_add(distribution.remainder)
            }
            RemainderPolicy::Burn => {
                core.burned = core.burned.saturating_add(distribution.remainder)
            }
        }

        core.history
            .confirm_closing_entry(height, block_digest.as_ref(), record.block_timestamp)?;

        record.finalized = true;
        record.finalized_votes = have;
        record.reward_total = reward_total;
        if core.pending.as_ref().map(|b| b.header.height) == Some(height) {
            core.pending = None;
        }
        info!(
            "block finalized at height {height} with {have}/{required} votes (reward {reward_total})"
        );
        Ok(FinalizedBlock {
            height,
            block_digest,
            votes: have,
            reward_total,
        })
    }

    // -- Accessors --

    pub fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    /// This node's identity.
    pub fn identity(&self) -> Pubkey {
        self.signer.pubkey()
    }

    pub fn current_height(&self) -> u64 {
        self.core().current_height
    }

    pub fn total_stake(&self) -> u64 {
        self.core().roster.total_stake()
    }

    pub fn validator(&self, address: &Pubkey) -> Option<Validator> {
        self.core().roster.get(address).cloned()
    }

    /// The roster in canonical order.
    pub fn validators(&self) -> Vec<Validator> {
        self.core().roster.validators().to_vec()
    }

    pub fn committees(&self) -> Vec<Committee> {
        self.core().committees.clone()
    }

    /// The full history sequence, genesis included.
    pub fn history_entries(&self) -> Vec<zen_history::HistoryEntry> {
        self.core().history.entries().to_vec()
    }

    pub fn pending_block(&self) -> Option<Block> {
        self.core().pending.clone()
    }

    pub fn recent_rewards(&self, limit: usize) -> Vec<RewardRecord> {
        self.core().ledger.recent(limit)
    }

    /// A consistent point-in-time status view.
    pub fn status(&self) -> ConsensusStatus {
        let core = self.core();
        let finality = self.finality();
        let last_finalized_height = finality
            .iter()
            .rev()
            .find(|(_, record)| record.finalized)
            .map(|(height, _)| *height);
        ConsensusStatus {
            chain_id: self.config.chain_id.clone(),
            current_height: core.current_height,
            validators: core.roster.len(),
            total_stake: core.roster.total_stake(),
            committees: core.committees.len(),
            history_len: core.history.len() as u64,
            last_finalized_height,
            pending_height: core.pending.as_ref().map(|b| b.header.height),
            treasury_accrued: core.treasury_accrued,
            burned: core.burned,
        }
    }

    /// Capture the aggregate for durable persistence.
    pub fn snapshot(&self) -> EngineSnapshot {
        let core = self.core();
        let finality = self.finality();
        EngineSnapshot {
            chain_id: self.config.chain_id.clone(),
            current_height: core.current_height,
            last_block_digest: core.last_block_digest,
            validators: core.roster.validators().to_vec(),
            committees: core.committees.clone(),
            history: core.history.entries().to_vec(),
            finality: finality.clone(),
            treasury_accrued: core.treasury_accrued,
            burned: core.burned,
        }
    }

    // -- Lock helpers (core before finality, always) --

    fn core(&self) -> MutexGuard<'_, EngineCore> {
        self.core.lock().unwrap()
    }

    fn finality(&self) -> MutexGuard<'_, BTreeMap<u64, FinalityRecord>> {
        self.finality.lock().unwrap()
    }
}
