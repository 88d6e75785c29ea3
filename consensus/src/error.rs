//! Typed error taxonomy for the consensus engine.
//!
//! Every failure is returned to the caller; nothing is logged and
//! swallowed. The one deliberate exception to erroring is the slash-penalty
//! clamp, which is a defined normalization rather than a fault.
//! `InsufficientSignatures` is an expected, retryable condition; the chain
//! errors indicate a node out of sync with agreed state and must reach the
//! resynchronization path, never a crash.

use {
    crate::config::ConfigError,
    solana_pubkey::Pubkey,
    thiserror::Error,
    zen_history::ChainError,
    zen_rewards::EmissionError,
};

/// Roster admission and membership errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    #[error("validator stake {stake} is below the minimum {min_stake}")]
    InsufficientStake { stake: u64, min_stake: u64 },
    #[error("validator {0} is already registered")]
    DuplicateValidator(Pubkey),
    #[error("validator {0} not found")]
    ValidatorNotFound(Pubkey),
}

/// Block production errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductionError {
    #[error("no validators available to propose")]
    NoValidators,
}

/// Finality errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FinalityError {
    /// The vote tally has not reached the BFT quorum yet. Retry as more
    /// votes arrive.
    #[error("insufficient signatures for finality: {have}/{need}")]
    InsufficientSignatures { have: usize, need: usize },
}

/// Umbrella error for engine operations that cross subsystems.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsensusError {
    #[error(transparent)]
    Admission(#[from] AdmissionError),
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error(transparent)]
    Production(#[from] ProductionError),
    #[error(transparent)]
    Finality(#[from] FinalityError),
    #[error(transparent)]
    Emission(#[from] EmissionError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
