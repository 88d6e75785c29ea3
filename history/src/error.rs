//! Chain-consistency errors.
//!
//! All three variants indicate a node that disagrees with the chain state it
//! was handed. None of them should be swallowed: `Discontinuity` and the
//! proof errors must surface to the resynchronization path owned by the
//! layer above the consensus core.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// The requested height is not the next step of the local chain.
    #[error("history discontinuity: requested height {requested}, chain tail is at index {tail}")]
    Discontinuity { requested: u64, tail: u64 },

    /// A block was presented without its history proof.
    #[error("block carries no history proof")]
    MissingProof,

    /// A history proof does not match the locally derived chain.
    #[error("invalid history proof: {reason}")]
    InvalidProof { reason: String },
}
