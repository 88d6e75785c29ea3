//! Append-only sequencer over the history chain.

use {
    crate::{entry::HistoryEntry, error::ChainError},
    log::*,
};

/// Owns the hash-chained history sequence.
///
/// The sequence always contains at least the genesis entry, entry indices
/// equal their position, and the chain is never truncated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistorySequencer {
    entries: Vec<HistoryEntry>,
}

impl HistorySequencer {
    /// Build a sequencer seeded with the deterministic genesis entry for
    /// `chain_id`.
    pub fn new(chain_id: &str) -> Self {
        let genesis = HistoryEntry::genesis(chain_id);
        debug!("history initialized with genesis digest {}", genesis.digest);
        Self {
            entries: vec![genesis],
        }
    }

    /// Rebuild from a persisted sequence, verifying the chain links.
    pub fn restore(entries: Vec<HistoryEntry>) -> Result<Self, ChainError> {
        let Some(genesis) = entries.first() else {
            return Err(ChainError::InvalidProof {
                reason: "persisted history is empty".to_string(),
            });
        };
        if genesis.index != 0 {
            return Err(ChainError::InvalidProof {
                reason: format!("persisted history starts at index {}", genesis.index),
            });
        }
        for pair in entries.windows(2) {
            if !pair[1].links_to(&pair[0]) {
                return Err(ChainError::InvalidProof {
                    reason: format!("broken chain link at index {}", pair[1].index),
                });
            }
        }
        Ok(Self { entries })
    }

    /// Idempotent initialization hook: the genesis entry already exists, so
    /// this is a no-op returning it.
    pub fn initialize(&self) -> &HistoryEntry {
        self.genesis()
    }

    pub fn genesis(&self) -> &HistoryEntry {
        &self.entries[0]
    }

    pub fn tail(&self) -> &HistoryEntry {
        self.entries.last().expect("history chain is never empty")
    }

    pub fn tail_index(&self) -> u64 {
        self.tail().index
    }

    /// Number of entries, genesis included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: u64) -> Option<&HistoryEntry> {
        usize::try_from(index).ok().and_then(|i| self.entries.get(i))
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Entry anchoring `height`.
    ///
    /// An existing entry is returned unchanged (idempotent read). Otherwise
    /// the chain is extended by exactly one step from the tail; a request
    /// for anything other than `tail + 1` fails with
    /// [`ChainError::Discontinuity`].
    pub fn entry_for(&mut self, height: u64, timestamp: i64) -> Result<HistoryEntry, ChainError> {
        if let Some(existing) = self.get(height) {
            return Ok(existing.clone());
        }
        let tail_index = self.tail_index();
        if height != tail_index.saturating_add(1) {
            return Err(ChainError::Discontinuity {
                requested: height,
                tail: tail_index,
            });
        }
        let entry = HistoryEntry::next(self.tail(), height, timestamp, Vec::new());
        trace!("history extended to index {} ({})", entry.index, entry.digest);
        self.entries.push(entry.clone());
        Ok(entry)
    }

    /// Finalization hook: confirm the entry closing `height`, appending it
    /// with the finalized block digest as payload if it does not exist yet.
    pub fn confirm_closing_entry(
        &mut self,
        height: u64,
        payload: &[u8],
        timestamp: i64,
    ) -> Result<HistoryEntry, ChainError> {
        if let Some(existing) = self.get(height) {
            return Ok(existing.clone());
        }
        let tail_index = self.tail_index();
        if height != tail_index.saturating_add(1) {
            return Err(ChainError::Discontinuity {
                requested: height,
                tail: tail_index,
            });
        }
        let entry = HistoryEntry::next(self.tail(), height, timestamp, payload.to_vec());
        self.entries.push(entry.clone());
        Ok(entry)
    }

    /// Check that `entry` matches the locally derived chain at its index.
    pub fn verify_link(&self, entry: &HistoryEntry) -> Result<(), ChainError> {
        let local = self.get(entry.index).ok_or_else(|| ChainError::InvalidProof {
            reason: format!("no local entry at index {}", entry.index),
        })?;
        if local.digest != entry.digest || local.previous_digest != entry.previous_digest {
            return Err(ChainError::InvalidProof {
                reason: format!("digest mismatch at index {}", entry.index),
            });
        }
        Ok(())
    }
}
