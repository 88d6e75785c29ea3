//! Zen Network node core.
//!
//! Hosts the long-running services that drive the consensus engine. The
//! engine itself ([`zen_consensus::ConsensusEngine`]) is pure state and
//! typed operations; this crate supplies the clock, the threads and the
//! channel plumbing around it.

pub mod consensus_service;

pub use consensus_service::{ConsensusService, FinalityVote};
