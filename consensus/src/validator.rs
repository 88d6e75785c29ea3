//! Validator records and slashing events.

use {
    serde::{Deserialize, Serialize},
    solana_pubkey::Pubkey,
};

/// Base units per unit of voting power (one ZEN).
pub const POWER_SCALE: u64 = 1_000_000_000;

/// Derived voting power: a fixed monotonic function of stake.
pub fn voting_power(stake: u64) -> u64 {
    stake / POWER_SCALE
}

/// Why a validator was slashed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlashReason {
    /// Signed two conflicting blocks or votes at the same height.
    DoubleSign,
    /// Failed to participate for an extended window.
    Downtime,
    /// Proposed a block that failed validation.
    InvalidBlock,
    /// Any other protocol-rule violation.
    RuleViolation,
}

impl std::fmt::Display for SlashReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlashReason::DoubleSign => write!(f, "DoubleSign"),
            SlashReason::Downtime => write!(f, "Downtime"),
            SlashReason::InvalidBlock => write!(f, "InvalidBlock"),
            SlashReason::RuleViolation => write!(f, "RuleViolation"),
        }
    }
}

/// One recorded violation. Immutable once appended to its validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlashingEvent {
    /// Engine height at the time of the slash.
    pub height: u64,
    pub reason: SlashReason,
    /// Base units deducted; never exceeds the stake held at the time.
    pub penalty: u64,
    pub timestamp: i64,
}

/// A network validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Validator {
    /// Unique identity; the roster key.
    pub address: Pubkey,
    /// Opaque verification key material. Signature schemes live outside the
    /// consensus core.
    pub verification_key: Vec<u8>,
    /// Staked base units (9 decimals).
    pub stake: u64,
    /// Derived voting power; kept in sync with `stake`.
    pub power: u64,
    /// Cumulative rewards credited across finalized heights.
    pub reward: u64,
    /// Set once the validator has ever been slashed.
    pub slashed: bool,
    pub slashing_events: Vec<SlashingEvent>,
    pub last_produced_height: Option<u64>,
    /// Green-validator reputation score.
    pub eco_score: f64,
}

impl Validator {
    pub fn new(address: Pubkey, verification_key: Vec<u8>, stake: u64) -> Self {
        Self {
            address,
            verification_key,
            stake,
            power: voting_power(stake),
            reward: 0,
            slashed: false,
            slashing_events: Vec::new(),
            last_produced_height: None,
            eco_score: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voting_power_is_monotonic() {
        assert_eq!(voting_power(0), 0);
        assert_eq!(voting_power(POWER_SCALE - 1), 0);
        assert_eq!(voting_power(POWER_SCALE), 1);
        assert_eq!(voting_power(5 * POWER_SCALE), 5);
        assert!(voting_power(7 * POWER_SCALE) > voting_power(3 * POWER_SCALE));
    }

    #[test]
    fn test_new_validator_defaults() {
        let v = Validator::new(Pubkey::new_unique(), vec![1, 2, 3], 2 * POWER_SCALE);
        assert_eq!(v.power, 2);
        assert_eq!(v.reward, 0);
        assert!(!v.slashed);
        assert!(v.slashing_events.is_empty());
        assert!(v.last_produced_height.is_none());
    }
}
