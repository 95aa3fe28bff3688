//! The copy-on-write sparse Merkle tree

use crate::error::SmtError;
use crate::hasher::{combine, default_hash, empty_root};
use crate::proof::SmtProof;
use crate::TREE_DEPTH;
use plasma_primitives::{Hash256, Slot};
use std::collections::HashMap;

/// A fixed-depth sparse Merkle tree over 256-bit slot keys.
///
/// Nodes are stored content-addressed (parent hash → child hashes), so every
/// update only writes the key's path and leaves all previously produced
/// roots resolvable. A leaf's value is a 32-byte hash; absent keys resolve
/// to the zero hash.
#[derive(Debug, Clone)]
pub struct SparseMerkleTree {
    nodes: HashMap<Hash256, (Hash256, Hash256)>,
    root: Hash256,
}

impl SparseMerkleTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            root: empty_root(),
        }
    }

    /// The current root.
    pub fn root(&self) -> Hash256 {
        self.root
    }

    /// Set `key` to `value`, returning the new root.
    ///
    /// The update is copy-on-write: nodes of earlier roots are retained, so
    /// proofs and lookups against an old root keep working.
    pub fn set(&mut self, key: Slot, value: Hash256) -> Hash256 {
        // Walk down the key path collecting each node's children, then
        // rebuild the path bottom-up around the new leaf.
        let mut path = Vec::with_capacity(TREE_DEPTH);
        let mut node = self.root;
        for level in (0..TREE_DEPTH).rev() {
            let (left, right) = self.children_or_default(&node, level);
            path.push((left, right));
            node = if key.bit(level) { right } else { left };
        }

        let mut acc = value;
        for level in 0..TREE_DEPTH {
            let (left, right) = path[TREE_DEPTH - 1 - level];
            let (l, r) = if key.bit(level) { (left, acc) } else { (acc, right) };
            let parent = combine(&l, &r);
            self.nodes.insert(parent, (l, r));
            acc = parent;
        }

        self.root = acc;
        acc
    }

    /// Look up `key` under the current root.
    ///
    /// Missing keys resolve to the zero hash; this never fails.
    pub fn get(&self, key: Slot) -> Hash256 {
        let mut node = self.root;
        for level in (0..TREE_DEPTH).rev() {
            let (left, right) = self.children_or_default(&node, level);
            node = if key.bit(level) { right } else { left };
        }
        node
    }

    /// Look up `key` under a historical root produced by this tree.
    pub fn get_at(&self, root: &Hash256, key: Slot) -> Result<Hash256, SmtError> {
        let mut node = *root;
        for level in (0..TREE_DEPTH).rev() {
            if node == default_hash(level + 1) {
                return Ok(Hash256::zero());
            }
            let (left, right) = self
                .nodes
                .get(&node)
                .copied()
                .ok_or(SmtError::UnknownNode(node))?;
            node = if key.bit(level) { right } else { left };
        }
        Ok(node)
    }

    /// Build an inclusion proof for `key` under the current root.
    ///
    /// Siblings are emitted leaf → root; siblings equal to the default
    /// subtree hash of their level are elided and tracked by the bitmap.
    pub fn create_merkle_proof(&self, key: Slot) -> SmtProof {
        let mut descent = Vec::with_capacity(TREE_DEPTH);
        let mut node = self.root;
        for level in (0..TREE_DEPTH).rev() {
            let (left, right) = self.children_or_default(&node, level);
            let (next, sibling) = if key.bit(level) {
                (right, left)
            } else {
                (left, right)
            };
            descent.push((level, sibling));
            node = next;
        }

        let mut proof = SmtProof::default();
        for (level, sibling) in descent.into_iter().rev() {
            if sibling != default_hash(level) {
                proof.push(level, sibling);
            }
        }
        proof
    }

    /// Build an inclusion proof for `key` under a historical root.
    pub fn create_merkle_proof_at(&self, root: &Hash256, key: Slot) -> Result<SmtProof, SmtError> {
        let mut descent = Vec::with_capacity(TREE_DEPTH);
        let mut node = *root;
        for level in (0..TREE_DEPTH).rev() {
            let (left, right) = if node == default_hash(level + 1) {
                (default_hash(level), default_hash(level))
            } else {
                self.nodes
                    .get(&node)
                    .copied()
                    .ok_or(SmtError::UnknownNode(node))?
            };
            let (next, sibling) = if key.bit(level) {
                (right, left)
            } else {
                (left, right)
            };
            descent.push((level, sibling));
            node = next;
        }

        let mut proof = SmtProof::default();
        for (level, sibling) in descent.into_iter().rev() {
            if sibling != default_hash(level) {
                proof.push(level, sibling);
            }
        }
        Ok(proof)
    }

    fn children_or_default(&self, node: &Hash256, child_height: usize) -> (Hash256, Hash256) {
        match self.nodes.get(node) {
            Some(&(left, right)) => (left, right),
            None => {
                let d = default_hash(child_height);
                (d, d)
            }
        }
    }
}

impl Default for SparseMerkleTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Root of the degenerate tree holding exactly one leaf.
///
/// Every sibling on the path is a default subtree hash, so the root folds
/// directly out of the leaf. This is how a deposit's single-transaction
/// block root is derived.
pub fn single_leaf_root(key: Slot, value: Hash256) -> Hash256 {
    let mut acc = value;
    for level in 0..TREE_DEPTH {
        let d = default_hash(level);
        acc = if key.bit(level) {
            combine(&d, &acc)
        } else {
            combine(&acc, &d)
        };
    }
    acc
}
