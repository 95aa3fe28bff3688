//! Sparse Merkle tree for child-chain transaction commitments
//!
//! A fixed-depth (256-level) authenticated map from coin slots to
//! transaction hashes. Key properties:
//! - Fixed depth: direct slot → path mapping over the full 256-bit key space
//! - Precomputed default subtree hashes: the empty tree needs no storage
//! - Copy-on-write updates: historical roots stay addressable for proofs
//! - Compact proofs: a 256-bit bitmap plus only the non-default siblings

mod error;
mod hasher;
mod proof;
mod tree;

pub use error::SmtError;
pub use hasher::{combine, default_hash, empty_root};
pub use proof::{verify, SmtProof};
pub use tree::{single_leaf_root, SparseMerkleTree};

/// Tree depth: one level per bit of the slot key.
pub const TREE_DEPTH: usize = 256;

#[cfg(test)]
mod tests {
    use super::*;
    use plasma_primitives::Hash256;
    use primitive_types::U256;

    #[test]
    fn test_empty_tree_root() {
        let tree = SparseMerkleTree::new();
        assert_eq!(tree.root(), empty_root());
    }

    #[test]
    fn test_set_and_verify() {
        let mut tree = SparseMerkleTree::new();
        let key = U256::from(42u64);
        let value = Hash256::sha256(b"tx");

        let root = tree.set(key, value);
        let proof = tree.create_merkle_proof(key);
        assert!(verify(&root, key, &value, &proof.to_bytes()));
    }
}
