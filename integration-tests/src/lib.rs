//! Zen Network Integration Tests
//!
//! Cross-crate scenario tests for the consensus engine and its driver.
//!
//! # Subsystems Tested
//!
//! 1. **History chain** — genesis determinism, hash-chain linkage,
//!    discontinuity handling, proof round-trips
//! 2. **Committees** — stake-gated admission, even partitioning, union
//!    invariant, post-removal absence
//! 3. **Determinism** — independently constructed engines fed identical
//!    operation sequences derive byte-identical history and committees
//! 4. **Finality** — BFT quorum arithmetic, vote deduplication, retryable
//!    shortfalls
//! 5. **Slashing** — penalty clamping, sub-minimum eviction, event records
//! 6. **End to end** — produce/commit/vote/finalize across heights, reward
//!    accounting, snapshot resume, the service loop as a network stand-in

pub mod harness;




#[cfg(test)]
mod finality_tests;


#[cfg(test)]
mod end_to_end_tests;
