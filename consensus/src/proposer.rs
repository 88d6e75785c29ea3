//! Block proposer selection.
//!
//! Selection is keyed purely by the history entry index: the proposer for a
//! height is `roster[entry.index % |roster|]` over canonical order. Every
//! node that agrees on the roster and the history chain agrees on the
//! proposer with no extra round of communication.
//!
//! Selection is unweighted round-robin, not stake-weighted sampling; the
//! heavier a validator's stake the more committees and rewards it touches,
//! but not its proposal frequency.

use {
    crate::{error::ProductionError, roster::ValidatorRoster},
    solana_pubkey::Pubkey,
    zen_history::HistoryEntry,
};

/// The proposer authorized for the height anchored by `entry`.
pub fn select_proposer(
    roster: &ValidatorRoster,
    entry: &HistoryEntry,
) -> Result<Pubkey, ProductionError> {
    if roster.is_empty() {
        return Err(ProductionError::NoValidators);
    }
    let position = (entry.index % roster.len() as u64) as usize;
    roster
        .at(position)
        .map(|v| v.address)
        .ok_or(ProductionError::NoValidators)
}

/// Whether `identity` is the authorized proposer for `entry`.
pub fn is_proposer(roster: &ValidatorRoster, identity: &Pubkey, entry: &HistoryEntry) -> bool {
    select_proposer(roster, entry)
        .map(|p| p == *identity)
        .unwrap_or(false)
}
