//! The active validator roster.
//!
//! Membership is gated on economic stake. Records are kept in canonical
//! order (stake descending, address ascending) so every node derives the
//! same ordering from the same membership — committee partitioning and
//! proposer selection both index into this order.

use {
    crate::{
        error::AdmissionError,
        validator::{voting_power, SlashReason, SlashingEvent, Validator},
    },
    log::*,
    solana_pubkey::Pubkey,
    std::collections::HashMap,
};

/// Outcome of a slash operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlashOutcome {
    /// Stake was reduced; the validator remains active.
    Penalized { penalty: u64, remaining_stake: u64 },
    /// The remaining stake fell below the minimum; the validator was
    /// evicted from the roster entirely.
    Evicted { penalty: u64 },
}

/// Stake-gated, canonically ordered validator set.
#[derive(Debug, Clone)]
pub struct ValidatorRoster {
    min_stake: u64,
    /// Canonical order: stake descending, address ascending on ties.
    validators: Vec<Validator>,
    /// Address -> position in `validators`; rebuilt on every reorder.
    index: HashMap<Pubkey, usize>,
    total_stake: u64,
}

impl ValidatorRoster {
    pub fn new(min_stake: u64) -> Self {
        Self {
            min_stake,
            validators: Vec::new(),
            index: HashMap::new(),
            total_stake: 0,
        }
    }

    /// Rebuild from already-admitted records (snapshot restore).
    pub fn from_validators(min_stake: u64, validators: Vec<Validator>) -> Self {
        let mut roster = Self {
            min_stake,
            validators,
            index: HashMap::new(),
            total_stake: 0,
        };
        roster.resort();
        roster
    }

    /// Admit a validator. Fails below the stake minimum or on a duplicate
    /// address.
    pub fn add(&mut self, validator: Validator) -> Result<(), AdmissionError> {
        if validator.stake < self.min_stake {
            return Err(AdmissionError::InsufficientStake {
                stake: validator.stake,
                min_stake: self.min_stake,
            });
        }
        if self.index.contains_key(&validator.address) {
            return Err(AdmissionError::DuplicateValidator(validator.address));
        }
        let mut validator = validator;
        validator.power = voting_power(validator.stake);
        info!(
            "validator admitted: {} (stake {}, power {})",
            validator.address, validator.stake, validator.power
        );
        self.validators.push(validator);
        self.resort();
        Ok(())
    }

    /// Remove a validator, returning its record.
    pub fn remove(&mut self, address: &Pubkey) -> Result<Validator, AdmissionError> {
        let position = *self
            .index
            .get(address)
            .ok_or(AdmissionError::ValidatorNotFound(*address))?;
        let removed = self.validators.remove(position);
        self.resort();
        info!("validator removed: {address}");
        Ok(removed)
    }

    /// Slash a validator's stake.
    ///
    /// The penalty is clamped to the current stake — a defined
    /// normalization, not an error path. If the remaining stake drops below
    /// the minimum the validator is evicted outright rather than lingering
    /// sub-minimum.
    pub fn slash(
        &mut self,
        address: &Pubkey,
        reason: SlashReason,
        penalty: u64,
        height: u64,
        timestamp: i64,
    ) -> Result<SlashOutcome, AdmissionError> {
        let position = *self
            .index
            .get(address)
            .ok_or(AdmissionError::ValidatorNotFound(*address))?;
        let validator = &mut self.validators[position];
        let penalty = penalty.min(validator.stake);
        validator.stake -= penalty;
        validator.power = voting_power(validator.stake);
        validator.slashed = true;
        validator.slashing_events.push(SlashingEvent {
            height,
            reason,
            penalty,
            timestamp,
        });
        warn!(
            "validator {address} slashed {penalty} ({reason}), stake now {}",
            validator.stake
        );

        let outcome = if validator.stake < self.min_stake {
            self.validators.remove(position);
            warn!("validator {address} evicted: stake below minimum {}", self.min_stake);
            SlashOutcome::Evicted { penalty }
        } else {
            SlashOutcome::Penalized {
                penalty,
                remaining_stake: self.validators[position].stake,
            }
        };
        self.resort();
        Ok(outcome)
    }

    /// Credit a finalized-height reward to a validator.
    pub fn credit_reward(&mut self, address: &Pubkey, amount: u64) {
        if let Some(&position) = self.index.get(address) {
            let validator = &mut self.validators[position];
            validator.reward = validator.reward.saturating_add(amount);
        }
    }

    /// Mark a validator as having produced the block at `height`.
    pub fn record_produced(&mut self, address: &Pubkey, height: u64) {
        if let Some(&position) = self.index.get(address) {
            self.validators[position].last_produced_height = Some(height);
        }
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    pub fn min_stake(&self) -> u64 {
        self.min_stake
    }

    pub fn total_stake(&self) -> u64 {
        self.total_stake
    }

    pub fn contains(&self, address: &Pubkey) -> bool {
        self.index.contains_key(address)
    }

    pub fn get(&self, address: &Pubkey) -> Option<&Validator> {
        self.index.get(address).map(|&i| &self.validators[i])
    }

    /// The validator at `position` in canonical order.
    pub fn at(&self, position: usize) -> Option<&Validator> {
        self.validators.get(position)
    }

    /// All records in canonical order.
    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    pub fn iter(&self) -> impl Iterator<Item = &Validator> {
        self.validators.iter()
    }

    pub fn addresses(&self) -> Vec<Pubkey> {
        self.validators.iter().map(|v| v.address).collect()
    }

    /// `(address, stake)` pairs in canonical order — the reward
    /// distribution input.
    pub fn stakes(&self) -> Vec<(Pubkey, u64)> {
        self.validators.iter().map(|v| (v.address, v.stake)).collect()
    }

    fn resort(&mut self) {
        self.validators.sort_by(|a, b| {
            b.stake
                .cmp(&a.stake)
                .then_with(|| a.address.cmp(&b.address))
        });
        self.total_stake = self
            .validators
            .iter()
            .fold(0u64, |acc, v| acc.saturating_add(v.stake));
        self.index = self
            .validators
            .iter()
            .enumerate()
            .map(|(i, v)| (v.address, i))
            .collect();
    }
}
