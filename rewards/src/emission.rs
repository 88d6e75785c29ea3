//! Block reward emission schedules.
//!
//! The consensus engine treats emission as an external collaborator behind
//! the [`EmissionSchedule`] trait: one call per finalized height, returning
//! the total reward to distribute for that height.

use {log::*, thiserror::Error};

/// One ZEN in base units (9 decimals).
pub const ZEN: u64 = 1_000_000_000;

/// Errors produced by an emission schedule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmissionError {
    /// The emission pool has been fully distributed; no reward exists for
    /// this or any later height.
    #[error("emission pool exhausted at height {height}")]
    PoolExhausted { height: u64 },
}

/// Source of the total block reward for a finalized height.
///
/// Implementations must be deterministic in `height`: every node asks the
/// same question and must get the same answer.
pub trait EmissionSchedule: Send {
    /// Total reward for the block at `height`. Draws down the pool.
    fn reward_for_height(&mut self, height: u64) -> Result<u64, EmissionError>;

    /// Base units still available for future heights.
    fn remaining_pool(&self) -> u64;

    /// Base units already paid out.
    fn distributed(&self) -> u64;
}

/// Tunables for [`HalvingEmission`].
#[derive(Debug, Clone)]
pub struct HalvingConfig {
    /// Total base units the schedule may ever emit.
    pub total_pool: u64,
    /// Per-block reward during phase 0.
    pub initial_reward: u64,
    /// Blocks per halving phase.
    pub halving_interval: u64,
    /// Per-phase decay, as the ratio `factor_num / factor_den`.
    /// The default 95/100 reduces the reward by 5% each phase.
    pub factor_num: u64,
    pub factor_den: u64,
}

impl Default for HalvingConfig {
    fn default() -> Self {
        Self {
            total_pool: 200_000_000 * ZEN,
            initial_reward: 1_000 * ZEN,
            halving_interval: 7_889_400, // ~3 months of 3-second blocks
            factor_num: 95,
            factor_den: 100,
        }
    }
}

/// Pool-capped exponential-decay emission.
///
/// The phase for a height is `height / halving_interval`; the phase reward
/// is `initial_reward * (factor)^phase` in integer arithmetic, clamped to
/// whatever remains in the pool.
#[derive(Debug, Clone)]
pub struct HalvingEmission {
    config: HalvingConfig,
    remaining: u64,
    distributed: u64,
    current_phase: u64,
}

impl HalvingEmission {
    pub fn new(config: HalvingConfig) -> Self {
        let remaining = config.total_pool;
        Self {
            config,
            remaining,
            distributed: 0,
            current_phase: 0,
        }
    }

    /// Reward for a given phase before pool clamping.
    fn phase_reward(&self, phase: u64) -> u64 {
        // A non-shrinking factor would make the walk below unbounded; treat
        // it as "no decay".
        if self.config.factor_num >= self.config.factor_den || self.config.factor_den == 0 {
            return self.config.initial_reward;
        }
        let mut reward = u128::from(self.config.initial_reward);
        for _ in 0..phase {
            reward = reward * u128::from(self.config.factor_num) / u128::from(self.config.factor_den);
            if reward == 0 {
                break;
            }
        }
        reward as u64
    }
}

impl Default for HalvingEmission {
    fn default() -> Self {
        Self::new(HalvingConfig::default())
    }
}

impl EmissionSchedule for HalvingEmission {
    fn reward_for_height(&mut self, height: u64) -> Result<u64, EmissionError> {
        let phase = if self.config.halving_interval == 0 {
            0
        } else {
            height / self.config.halving_interval
        };
        if phase != self.current_phase {
            info!(
                "emission phase {} -> {} at height {height} (reward {} -> {})",
                self.current_phase,
                phase,
                self.phase_reward(self.current_phase),
                self.phase_reward(phase),
            );
            self.current_phase = phase;
        }

        let mut reward = self.phase_reward(phase);
        if reward > self.remaining {
            reward = self.remaining;
        }
        if reward == 0 {
            return Err(EmissionError::PoolExhausted { height });
        }

        self.remaining -= reward;
        self.distributed = self.distributed.saturating_add(reward);
        Ok(reward)
    }

    fn remaining_pool(&self) -> u64 {
        self.remaining
    }

    fn distributed(&self) -> u64 {
        self.distributed
    }
}
