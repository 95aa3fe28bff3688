//! Error types for sparse Merkle tree operations

use plasma_primitives::Hash256;
use thiserror::Error;

/// Errors that can occur while reading or proving against a tree
#[derive(Debug, Error)]
pub enum SmtError {
    /// An internal node could not be resolved while walking a key path,
    /// i.e. the presented root was never produced by this tree
    #[error("unresolvable node {0} while walking tree")]
    UnknownNode(Hash256),

    /// A proof's byte layout is not well formed
    #[error("malformed proof: {0}")]
    MalformedProof(String),
}
