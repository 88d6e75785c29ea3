//! Zen Network block reward subsystem.
//!
//! Two halves, consumed by the consensus engine exactly once per finalized
//! height:
//!
//! - [`emission`] — how large the total reward for a height is. The
//!   production schedule is [`HalvingEmission`], a pool-capped exponential
//!   decay: every `halving_interval` blocks the per-block reward shrinks by
//!   5%, and once the emission pool is empty the schedule fails with
//!   [`EmissionError::PoolExhausted`].
//! - [`distributor`] — how that total is split across the roster. Shares are
//!   stake-proportional with integer floor division; the division remainder
//!   is never dropped silently but disposed of under an explicit
//!   [`RemainderPolicy`].
//!
//! [`ledger`] keeps a bounded in-memory history of recent payouts for
//! inspection.

pub mod distributor;
pub mod emission;
pub mod ledger;

// Re-exports for convenience.
pub use distributor::{distribute, Distribution, RemainderPolicy};
pub use emission::{EmissionError, EmissionSchedule, HalvingConfig, HalvingEmission, ZEN};
pub use ledger::{RewardLedger, RewardRecord, REWARD_HISTORY_CAP};
