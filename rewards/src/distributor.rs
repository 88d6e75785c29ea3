//! Stake-proportional reward distribution.
//!
//! Every node must compute byte-identical payouts from the same inputs, so
//! all share arithmetic is integer division with floor rounding; the
//! remainder is disposed of under an explicit, network-pinned policy rather
//! than being rounded away differently on different implementations.

use solana_pubkey::Pubkey;

/// What happens to the integer-division remainder of a block reward.
///
/// The Zen Network pins [`RemainderPolicy::Treasury`]; `Burn` exists so the
/// pinned rule is an explicit choice at the call site, not an implicit one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemainderPolicy {
    /// The remainder is destroyed (total supply shrinks).
    Burn,
    /// The remainder accrues to the network treasury.
    Treasury,
}

/// The result of splitting one block reward across the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
    /// Per-validator shares, in roster order. `sum(shares) + remainder`
    /// always equals the distributed total.
    pub shares: Vec<(Pubkey, u64)>,
    /// Base units left over after floor division.
    pub remainder: u64,
    /// The policy the remainder is subject to.
    pub policy: RemainderPolicy,
}

/// Split `total` across `stakes` proportionally to stake.
///
/// `share_i = floor(total * stake_i / total_stake)` computed in 128-bit
/// intermediates so large pools cannot overflow. An empty roster (or zero
/// total stake) produces no shares and the whole amount as remainder.
pub fn distribute(total: u64, stakes: &[(Pubkey, u64)], policy: RemainderPolicy) -> Distribution {
    let total_stake: u128 = stakes.iter().map(|(_, stake)| u128::from(*stake)).sum();
    if total_stake == 0 || total == 0 {
        return Distribution {
            shares: Vec::new(),
            remainder: total,
            policy,
        };
    }

    let mut paid: u64 = 0;
    let shares: Vec<(Pubkey, u64)> = stakes
        .iter()
        .map(|(address, stake)| {
            let share = (u128::from(total) * u128::from(*stake) / total_stake) as u64;
            paid = paid.saturating_add(share);
            (*address, share)
        })
        .collect();

    Distribution {
        shares,
        remainder: total - paid,
        policy,
    }
}
