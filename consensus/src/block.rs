//! Candidate blocks and their history proofs.
//!
//! A produced block carries a [`HistoryProof`]: the history entry anchoring
//! its height, the proposer identity, and a signature placeholder. Proof
//! bytes may be hashed or signed downstream, so the encoding is versioned
//! and canonical — a fixed field layout behind a leading version byte,
//! identical on every implementation.

use {
    borsh::{BorshDeserialize, BorshSerialize},
    solana_hash::Hash,
    solana_pubkey::Pubkey,
    solana_sha256_hasher::hashv,
    solana_signature::Signature,
    zen_history::{ChainError, HistoryEntry},
};

/// Current canonical encoding version for [`HistoryProof`].
pub const HISTORY_PROOF_VERSION: u8 = 1;

/// Block header fields covered by the block digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub height: u64,
    /// Unix timestamp in milliseconds at production time.
    pub timestamp: i64,
    /// Digest of the previous committed block.
    pub previous_digest: Hash,
    pub proposer: Pubkey,
}

/// Proof that a block's height is anchored in the history chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryProof {
    /// The history entry for the block's height.
    pub entry: HistoryEntry,
    pub proposer: Pubkey,
    /// Proposer signature over the block digest (opaque capability).
    pub signature: Signature,
    pub produced_at: i64,
}

/// Canonical v1 wire layout. Raw fixed-width fields only, so the byte
/// stream is identical across implementations.
#[derive(BorshSerialize, BorshDeserialize)]
struct ProofBodyV1 {
    entry_index: u64,
    entry_digest: [u8; 32],
    entry_previous_digest: [u8; 32],
    entry_timestamp: i64,
    entry_payload: Vec<u8>,
    proposer: [u8; 32],
    signature: [u8; 64],
    produced_at: i64,
}

impl HistoryProof {
    /// Canonical encoding: version byte followed by the v1 body.
    pub fn encode(&self) -> Result<Vec<u8>, ChainError> {
        let mut signature = [0u8; 64];
        signature.copy_from_slice(self.signature.as_ref());
        let body = ProofBodyV1 {
            entry_index: self.entry.index,
            entry_digest: self.entry.digest.to_bytes(),
            entry_previous_digest: self.entry.previous_digest.to_bytes(),
            entry_timestamp: self.entry.timestamp,
            entry_payload: self.entry.payload.clone(),
            proposer: self.proposer.to_bytes(),
            signature,
            produced_at: self.produced_at,
        };
        let mut bytes = vec![HISTORY_PROOF_VERSION];
        let encoded = borsh::to_vec(&body).map_err(|err| ChainError::InvalidProof {
            reason: format!("proof encoding failed: {err}"),
        })?;
        bytes.extend_from_slice(&encoded);
        Ok(bytes)
    }

    /// Decode a canonical proof, rejecting unknown versions.
    pub fn decode(bytes: &[u8]) -> Result<Self, ChainError> {
        let (&version, body) = bytes.split_first().ok_or_else(|| ChainError::InvalidProof {
            reason: "empty proof".to_string(),
        })?;
        if version != HISTORY_PROOF_VERSION {
            return Err(ChainError::InvalidProof {
                reason: format!("unsupported proof version {version}"),
            });
        }
        let body = ProofBodyV1::try_from_slice(body).map_err(|err| ChainError::InvalidProof {
            reason: format!("proof decoding failed: {err}"),
        })?;
        Ok(Self {
            entry: HistoryEntry {
                index: body.entry_index,
                digest: Hash::new_from_array(body.entry_digest),
                previous_digest: Hash::new_from_array(body.entry_previous_digest),
                timestamp: body.entry_timestamp,
                payload: body.entry_payload,
            },
            proposer: Pubkey::new_from_array(body.proposer),
            signature: Signature::from(body.signature),
            produced_at: body.produced_at,
        })
    }
}

/// A candidate block moving through Proposed -> Committed -> Finalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub header: BlockHeader,
    /// Digest of the execution payload (opaque to the consensus core).
    pub payload_digest: Hash,
    pub proof: Option<HistoryProof>,
}

impl Block {
    /// Deterministic digest over the header and payload digest.
    pub fn digest(&self) -> Hash {
        hashv(&[
            self.header.previous_digest.as_ref(),
            &self.header.height.to_be_bytes(),
            &self.header.timestamp.to_be_bytes(),
            self.payload_digest.as_ref(),
            self.header.proposer.as_ref(),
        ])
    }

    /// The attached history proof, or `MissingProof`.
    pub fn proof(&self) -> Result<&HistoryProof, ChainError> {
        self.proof.as_ref().ok_or(ChainError::MissingProof)
    }
}
