//! A single link in the history chain.

use {
    serde::{Deserialize, Serialize},
    solana_hash::Hash,
    solana_sha256_hasher::hashv,
};

/// One hash-chained history entry.
///
/// `digest` commits to the previous digest, the height and the block
/// timestamp, all in big-endian fixed-width encodings so every node hashes
/// identical bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Position in the chain; equals the block height it anchors.
    pub index: u64,
    pub digest: Hash,
    pub previous_digest: Hash,
    /// Block timestamp carried by the entry. An input, never a local clock.
    pub timestamp: i64,
    /// Opaque payload (genesis seed, or the finalized block digest for a
    /// closing entry).
    pub payload: Vec<u8>,
}

impl HistoryEntry {
    /// The deterministic genesis entry for a chain id.
    pub fn genesis(chain_id: &str) -> Self {
        Self {
            index: 0,
            digest: hashv(&[chain_id.as_bytes()]),
            previous_digest: Hash::default(),
            timestamp: 0,
            payload: chain_id.as_bytes().to_vec(),
        }
    }

    /// The entry one step past `previous`.
    pub fn next(previous: &HistoryEntry, height: u64, timestamp: i64, payload: Vec<u8>) -> Self {
        let digest = hashv(&[
            previous.digest.as_ref(),
            &height.to_be_bytes(),
            &timestamp.to_be_bytes(),
        ]);
        Self {
            index: previous.index.saturating_add(1),
            digest,
            previous_digest: previous.digest,
            timestamp,
            payload,
        }
    }

    /// Whether `self` is the valid successor of `previous`.
    pub fn links_to(&self, previous: &HistoryEntry) -> bool {
        self.previous_digest == previous.digest
            && self.index == previous.index.saturating_add(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genesis_is_deterministic() {
        let a = HistoryEntry::genesis("zen-mainnet");
        let b = HistoryEntry::genesis("zen-mainnet");
        assert_eq!(a, b);
        assert_eq!(a.index, 0);
        assert_eq!(a.previous_digest, Hash::default());
    }

    #[test]
    fn test_genesis_differs_per_chain_id() {
        let mainnet = HistoryEntry::genesis("zen-mainnet");
        let testnet = HistoryEntry::genesis("zen-testnet");
        assert_ne!(mainnet.digest, testnet.digest);
    }

    #[test]
    fn test_next_links_back() {
        let genesis = HistoryEntry::genesis("zen-mainnet");
        let next = HistoryEntry::next(&genesis, 1, 1_000, Vec::new());
        assert!(next.links_to(&genesis));
        assert_eq!(next.index, 1);
        assert_eq!(next.previous_digest, genesis.digest);
    }

    #[test]
    fn test_digest_covers_height_and_timestamp() {
        let genesis = HistoryEntry::genesis("zen-mainnet");
        let a = HistoryEntry::next(&genesis, 1, 1_000, Vec::new());
        let b = HistoryEntry::next(&genesis, 1, 2_000, Vec::new());
        assert_ne!(a.digest, b.digest);
    }
}
