//! Shard committee partitioning.
//!
//! Committees are a pure function of roster membership and canonical order:
//! every node computes byte-identical partitions from the same roster, or
//! they would disagree about who may propose on which shard. No wall-clock
//! time and no external randomness feed the partition.

use {
    crate::roster::ValidatorRoster,
    log::*,
    serde::{Deserialize, Serialize},
    solana_pubkey::Pubkey,
};

/// One shard's committee. Members reference roster records by identity key
/// only; validator data is never copied out of the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Committee {
    pub shard_id: u32,
    /// Member addresses in canonical roster order.
    pub members: Vec<Pubkey>,
    /// History index at which this partition was computed.
    pub formed_at_index: u64,
}

/// Partition the roster into exactly `shard_count` committees, as evenly as
/// the roster size allows.
///
/// With `n` validators and `s` shards, the first `n % s` committees take
/// `n / s + 1` contiguous members and the rest take `n / s`; a roster
/// smaller than the shard count leaves the trailing committees empty. The
/// multiset union of all committees always equals the roster.
pub fn partition(
    roster: &ValidatorRoster,
    shard_count: u32,
    formed_at_index: u64,
) -> Vec<Committee> {
    let shards = shard_count as usize;
    if shards == 0 {
        return Vec::new();
    }
    let n = roster.len();
    let base = n / shards;
    let extra = n % shards;

    let mut committees = Vec::with_capacity(shards);
    let mut cursor = 0usize;
    for shard_id in 0..shards {
        let take = base + usize::from(shard_id < extra);
        let members = roster
            .iter()
            .skip(cursor)
            .take(take)
            .map(|v| v.address)
            .collect();
        cursor += take;
        committees.push(Committee {
            shard_id: shard_id as u32,
            members,
            formed_at_index,
        });
    }
    debug!(
        "reshuffled {n} validators into {shards} committees ({base}..={} per shard)",
        base + usize::from(extra > 0)
    );
    committees
}

/// The shard a validator currently sits on, if any.
pub fn shard_of(committees: &[Committee], address: &Pubkey) -> Option<u32> {
    committees
        .iter()
        .find(|c| c.members.contains(address))
        .map(|c| c.shard_id)
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::validator::{Validator, POWER_SCALE},
    };

    const MIN_STAKE: u64 = 1_000 * POWER_SCALE;

    fn make_roster(n: usize) -> ValidatorRoster {
        let mut roster = ValidatorRoster::new(MIN_STAKE);
        for _ in 0..n {
            roster
                .add(Validator::new(Pubkey::new_unique(), Vec::new(), MIN_STAKE))
                .unwrap();
        }
        roster
    }

    fn all_members(committees: &[Committee]) -> Vec<Pubkey> {
        committees.iter().flat_map(|c| c.members.clone()).collect()
    }

    #[test]
    fn test_union_equals_roster() {
        let roster = make_roster(13);
        let committees = partition(&roster, 4, 0);
        let mut members = all_members(&committees);
        let mut addresses = roster.addresses();
        members.sort();
        addresses.sort();
        assert_eq!(members, addresses);
    }

    #[test]
    fn test_even_partition() {
        let roster = make_roster(12);
        let committees = partition(&roster, 4, 0);
        assert_eq!(committees.len(), 4);
        for committee in &committees {
            assert_eq!(committee.members.len(), 3);
        }
    }

    #[test]
    fn test_uneven_partition_spreads_extras() {
        let roster = make_roster(10);
        let committees = partition(&roster, 4, 0);
        let sizes: Vec<usize> = committees.iter().map(|c| c.members.len()).collect();
        assert_eq!(sizes, vec![3, 3, 2, 2]);
    }

    #[test]
    fn test_roster_smaller_than_shard_count() {
        let roster = make_roster(3);
        let committees = partition(&roster, 8, 0);
        assert_eq!(committees.len(), 8);
        let sizes: Vec<usize> = committees.iter().map(|c| c.members.len()).collect();
        assert_eq!(sizes, vec![1, 1, 1, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_empty_roster_forms_empty_committees() {
        let roster = make_roster(0);
        let committees = partition(&roster, 4, 0);
        assert_eq!(committees.len(), 4);
        assert!(committees.iter().all(|c| c.members.is_empty()));
    }

    #[test]
    fn test_each_validator_in_exactly_one_committee() {
        let roster = make_roster(9);
        let committees = partition(&roster, 4, 0);
        for address in roster.addresses() {
            let holding: Vec<u32> = committees
                .iter()
                .filter(|c| c.members.contains(&address))
                .map(|c| c.shard_id)
                .collect();
            assert_eq!(holding.len(), 1, "validator {address} in {holding:?}");
        }
    }

    #[test]
    fn test_partition_is_deterministic() {
        let roster = make_roster(17);
        let a = partition(&roster, 5, 42);
        let b = partition(&roster, 5, 42);
        assert_eq!(a, b);
    }

    #[test]
    fn test_shard_of() {
        let roster = make_roster(6);
        let committees = partition(&roster, 3, 0);
        let first = roster.at(0).unwrap().address;
        assert_eq!(shard_of(&committees, &first), Some(0));
        assert_eq!(shard_of(&committees, &Pubkey::new_unique()), None);
    }
}
