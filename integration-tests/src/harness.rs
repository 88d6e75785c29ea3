//! Zen Test Harness
//!
//! A lightweight environment for integration-testing the consensus engine.
//! It does NOT spin up networking or a full node; it provides deterministic
//! validators, genesis configuration and drive-to-finality helpers that
//! exercise the crate APIs directly.

use {
    solana_hash::Hash,
    solana_keypair::Keypair,
    solana_pubkey::Pubkey,
    solana_signer::Signer,
    std::sync::Arc,
    zen_consensus::{ConsensusConfig, ConsensusEngine, FinalizedBlock, GenesisValidator},
    zen_rewards::{EmissionError, EmissionSchedule},
};

// ─── Constants ───────────────────────────────────────────────────────────────

/// One ZEN in base units.
pub const ZEN: u64 = 1_000_000_000;

/// Default validator stake used in tests (1_000 ZEN — exactly the
/// admission minimum).
pub const DEFAULT_STAKE: u64 = 1_000 * ZEN;

/// Default per-height reward paid by the fixed test emission.
pub const DEFAULT_REWARD: u64 = 1_000;

// ─── Test emission ───────────────────────────────────────────────────────────

/// Constant-reward emission so tests control payout arithmetic exactly.
pub struct FixedEmission {
    reward: u64,
    distributed: u64,
}

impl FixedEmission {
    pub fn new(reward: u64) -> Self {
        Self {
            reward,
            distributed: 0,
        }
    }
}

impl EmissionSchedule for FixedEmission {
    fn reward_for_height(&mut self, _height: u64) -> Result<u64, EmissionError> {
        self.distributed += self.reward;
        Ok(self.reward)
    }
    fn remaining_pool(&self) -> u64 {
        u64::MAX
    }
    fn distributed(&self) -> u64 {
        self.distributed
    }
}

// ─── Test validator ──────────────────────────────────────────────────────────

/// A test validator with its identity keypair and stake.
#[derive(Debug)]
pub struct TestValidator {
    pub keypair: Keypair,
    pub stake: u64,
}

impl TestValidator {
    pub fn new(stake: u64) -> Self {
        Self {
            keypair: Keypair::new(),
            stake,
        }
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }
}

/// A deterministic address for cross-engine determinism tests: engines on
/// "different nodes" must be handed identical rosters.
pub fn deterministic_pubkey(i: u8) -> Pubkey {
    let mut bytes = [0u8; 32];
    bytes[0] = i;
    bytes[31] = 0xBB;
    Pubkey::new_from_array(bytes)
}

// ─── Test harness ────────────────────────────────────────────────────────────

/// Sets up validators and genesis configuration for one test.
pub struct ZenTestHarness {
    pub validators: Vec<TestValidator>,
    pub config: ConsensusConfig,
    /// Shared signing identity so deterministic tests can construct several
    /// engines producing byte-identical blocks.
    pub signer: Arc<Keypair>,
}

impl ZenTestHarness {
    /// `n` validators with equal default stake.
    pub fn new(n: usize) -> Self {
        Self::with_stakes(&vec![DEFAULT_STAKE; n])
    }

    /// One validator per stake entry.
    pub fn with_stakes(stakes: &[u64]) -> Self {
        Self {
            validators: stakes.iter().map(|stake| TestValidator::new(*stake)).collect(),
            config: ConsensusConfig {
                chain_id: "zen-testnet".to_string(),
                shard_count: 4,
                ..ConsensusConfig::default()
            },
            signer: Arc::new(Keypair::new()),
        }
    }

    pub fn addresses(&self) -> Vec<Pubkey> {
        self.validators.iter().map(|v| v.pubkey()).collect()
    }

    pub fn genesis(&self) -> Vec<GenesisValidator> {
        self.validators
            .iter()
            .map(|v| GenesisValidator {
                address: v.pubkey(),
                verification_key: v.pubkey().to_bytes().to_vec(),
                stake: v.stake,
            })
            .collect()
    }

    /// Build an engine over this harness's genesis with the fixed test
    /// emission.
    pub fn build_engine(&self) -> ConsensusEngine {
        self.build_engine_with_emission(Box::new(FixedEmission::new(DEFAULT_REWARD)))
    }

    pub fn build_engine_with_emission(
        &self,
        emission: Box<dyn EmissionSchedule>,
    ) -> ConsensusEngine {
        ConsensusEngine::new(
            self.config.clone(),
            self.signer.clone(),
            self.genesis(),
            emission,
        )
        .expect("test genesis must be admissible")
    }
}

// ─── Drive helpers ───────────────────────────────────────────────────────────

/// Produce and commit the block for `height` with a deterministic
/// timestamp.
pub fn produce_and_commit(engine: &ConsensusEngine, height: u64) -> zen_consensus::Block {
    let block = engine
        .produce_block(height, height as i64 * 1_000, Hash::default())
        .expect("production should succeed");
    engine.commit_block(&block).expect("commit should succeed");
    block
}

/// Drive `height` all the way to finality with votes from `voters`.
pub fn finalize_with_votes(
    engine: &ConsensusEngine,
    height: u64,
    voters: &[Pubkey],
) -> FinalizedBlock {
    produce_and_commit(engine, height);
    for voter in voters {
        engine.record_finality_vote(height, *voter);
    }
    engine
        .finalize_block(height)
        .expect("quorum should finalize")
}
