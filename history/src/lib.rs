//! Zen Network Proof-of-History chain.
//!
//! A sequential, hash-chained record that anchors elapsed "virtual time" to
//! block heights, so proposer selection needs no extra communication round.
//! The chain is a replayable audit trail: two nodes fed the same inputs
//! derive byte-identical sequences, because
//!
//! - the genesis entry is a pure function of the chain id,
//! - every later digest covers only its inputs (previous digest, height,
//!   block timestamp), never a local clock,
//! - the chain advances exactly one step at a time — a caller that wants
//!   height `H` must already have materialized `H - 1`.
//!
//! Any construction that allowed skipping ahead would let honest nodes
//! derive different sequences from the same operation log, so
//! out-of-sequence requests fail with [`ChainError::Discontinuity`].

pub mod entry;
pub mod error;
pub mod sequencer;

// Re-exports for convenience.
pub use entry::HistoryEntry;
pub use error::ChainError;
pub use sequencer::HistorySequencer;
