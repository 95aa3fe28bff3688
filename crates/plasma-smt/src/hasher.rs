//! Node hashing and the default (all-empty) subtree chain

use crate::TREE_DEPTH;
use plasma_primitives::Hash256;
use std::sync::OnceLock;

static DEFAULT_HASHES: OnceLock<Vec<Hash256>> = OnceLock::new();

/// Hash of an internal node from its two children.
pub fn combine(left: &Hash256, right: &Hash256) -> Hash256 {
    Hash256::sha256_pair(left, right)
}

/// Root hash of an all-empty subtree of the given height.
///
/// Height 0 is the empty leaf (the zero hash); height `TREE_DEPTH` is the
/// root of a fully empty tree.
pub fn default_hash(height: usize) -> Hash256 {
    default_hashes()[height]
}

/// Root of the empty tree.
pub fn empty_root() -> Hash256 {
    default_hash(TREE_DEPTH)
}

fn default_hashes() -> &'static [Hash256] {
    DEFAULT_HASHES.get_or_init(|| {
        let mut table = Vec::with_capacity(TREE_DEPTH + 1);
        table.push(Hash256::zero());
        for height in 1..=TREE_DEPTH {
            let child = table[height - 1];
            table.push(combine(&child, &child));
        }
        table
    })
}
