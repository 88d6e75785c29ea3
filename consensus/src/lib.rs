//! Zen Network hybrid PoS + PoH consensus engine.
//!
//! The validator-side consensus core: it maintains the stake-gated roster,
//! partitions it into deterministic shard committees, selects block
//! proposers off the history chain, drives candidate blocks through
//! `Proposed -> Committed -> Finalized`, and pays out stake-proportional
//! rewards once a height is irreversibly final under the BFT quorum rule.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                ConsensusEngine                  │
//! │  ┌──────────┐  ┌────────────┐  ┌─────────────┐  │
//! │  │ Config   │  │ Validator  │  │ History     │  │
//! │  │          │  │ Roster     │  │ Sequencer   │  │
//! │  └──────────┘  └─────┬──────┘  └──────┬──────┘  │
//! │                ┌─────▼──────┐  ┌──────▼──────┐  │
//! │                │ Committees │  │ Proposer    │  │
//! │                │ (shards)   │  │ Selection   │  │
//! │                └────────────┘  └──────┬──────┘  │
//! │  ┌───────────────────────┐     ┌──────▼──────┐  │
//! │  │ Finality Records      │◀────│ Pending     │  │
//! │  │ (votes, quorum, paid) │     │ Block       │  │
//! │  └───────────┬───────────┘     └─────────────┘  │
//! │        ┌─────▼──────┐                           │
//! │        │ Reward     │                           │
//! │        │ Distributor│                           │
//! │        └────────────┘                           │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! Everything the engine decides must be replicated bit-for-bit across
//! independent nodes: the history chain, the committee partition, proposer
//! selection and reward arithmetic are all pure functions of replicated
//! state, with no wall-clock or local randomness inputs.

pub mod block;
pub mod committee;
pub mod config;
pub mod engine;
pub mod error;
pub mod proposer;
pub mod roster;
pub mod snapshot;
pub mod validator;

// Re-exports for convenience.
pub use block::{Block, BlockHeader, HistoryProof, HISTORY_PROOF_VERSION};
pub use committee::Committee;
pub use config::{ConfigError, ConsensusConfig, GenesisValidator};
pub use engine::{quorum_size, ConsensusEngine, ConsensusStatus, FinalizedBlock};
pub use error::{AdmissionError, ConsensusError, FinalityError, ProductionError};
pub use roster::{SlashOutcome, ValidatorRoster};
pub use snapshot::{EngineSnapshot, SnapshotError, SnapshotStore};
pub use validator::{SlashReason, SlashingEvent, Validator};
// The chain-consistency errors live with the history crate.
pub use zen_history::ChainError;
