//! Compact inclusion proofs and stateless verification

use crate::error::SmtError;
use crate::hasher::{combine, default_hash};
use crate::TREE_DEPTH;
use plasma_primitives::{Hash256, Slot};

const BITMAP_LEN: usize = TREE_DEPTH / 8;

/// A compact inclusion proof: a 256-bit level bitmap plus the non-default
/// sibling hashes, ordered leaf → root.
///
/// Bit `i` of the bitmap (read as a 256-bit big-endian integer) is set iff
/// the sibling at level `i` differs from that level's default subtree hash
/// and is therefore carried explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmtProof {
    bitmap: [u8; BITMAP_LEN],
    siblings: Vec<Hash256>,
}

impl SmtProof {
    /// The explicit (non-default) siblings, leaf → root.
    pub fn siblings(&self) -> &[Hash256] {
        &self.siblings
    }

    /// Whether the sibling at `level` is carried explicitly.
    pub fn has_level(&self, level: usize) -> bool {
        bitmap_bit(&self.bitmap, level)
    }

    /// Record the explicit sibling for `level`. Levels must be pushed in
    /// ascending order to keep the sibling list leaf → root.
    pub(crate) fn push(&mut self, level: usize, sibling: Hash256) {
        set_bitmap_bit(&mut self.bitmap, level);
        self.siblings.push(sibling);
    }

    /// Wire form: bitmap followed by the explicit siblings.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(BITMAP_LEN + self.siblings.len() * 32);
        out.extend_from_slice(&self.bitmap);
        for sibling in &self.siblings {
            out.extend_from_slice(sibling.as_bytes());
        }
        out
    }

    /// Hex wire form, as carried over the contract-API boundary.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Strict parse of the wire form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SmtError> {
        if bytes.len() < BITMAP_LEN {
            return Err(SmtError::MalformedProof(format!(
                "proof too short: {} bytes",
                bytes.len()
            )));
        }
        let mut bitmap = [0u8; BITMAP_LEN];
        bitmap.copy_from_slice(&bytes[..BITMAP_LEN]);

        let rest = &bytes[BITMAP_LEN..];
        if rest.len() % 32 != 0 {
            return Err(SmtError::MalformedProof(format!(
                "sibling payload not a multiple of 32: {} bytes",
                rest.len()
            )));
        }

        let expected = (0..TREE_DEPTH).filter(|&l| bitmap_bit(&bitmap, l)).count();
        if rest.len() / 32 != expected {
            return Err(SmtError::MalformedProof(format!(
                "bitmap names {} siblings but payload carries {}",
                expected,
                rest.len() / 32
            )));
        }

        let siblings = rest
            .chunks_exact(32)
            .map(|chunk| {
                let mut arr = [0u8; 32];
                arr.copy_from_slice(chunk);
                Hash256::from_bytes(arr)
            })
            .collect();

        Ok(Self { bitmap, siblings })
    }
}

/// Verify that `value` sits at `key` under `root`.
///
/// The fold recomputes the root from the leaf upward, drawing elided
/// siblings from the default chain. Malformed proofs (wrong length, bitmap
/// mismatch, trailing bytes) simply fail verification; this never panics
/// and never errors.
pub fn verify(root: &Hash256, key: Slot, value: &Hash256, proof: &[u8]) -> bool {
    if proof.len() < BITMAP_LEN || (proof.len() - BITMAP_LEN) % 32 != 0 {
        return false;
    }
    let bitmap = &proof[..BITMAP_LEN];
    let mut cursor = &proof[BITMAP_LEN..];

    let mut acc = *value;
    for level in 0..TREE_DEPTH {
        let sibling = if bitmap_bit_slice(bitmap, level) {
            if cursor.len() < 32 {
                return false;
            }
            let mut arr = [0u8; 32];
            arr.copy_from_slice(&cursor[..32]);
            cursor = &cursor[32..];
            Hash256::from_bytes(arr)
        } else {
            default_hash(level)
        };

        acc = if key.bit(level) {
            combine(&sibling, &acc)
        } else {
            combine(&acc, &sibling)
        };
    }

    // Unconsumed siblings mean the bitmap and payload disagree.
    if !cursor.is_empty() {
        return false;
    }

    acc == *root
}

fn bitmap_bit(bitmap: &[u8; BITMAP_LEN], level: usize) -> bool {
    bitmap_bit_slice(bitmap, level)
}

fn bitmap_bit_slice(bitmap: &[u8], level: usize) -> bool {
    (bitmap[BITMAP_LEN - 1 - level / 8] >> (level % 8)) & 1 == 1
}

fn set_bitmap_bit(bitmap: &mut [u8; BITMAP_LEN], level: usize) {
    bitmap[BITMAP_LEN - 1 - level / 8] |= 1 << (level % 8);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::SparseMerkleTree;
    use primitive_types::U256;

    fn populated_tree() -> (SparseMerkleTree, Slot, Hash256) {
        let mut tree = SparseMerkleTree::new();
        let key = U256::from(0x0303u64);
        let value = Hash256::sha256(b"leaf");
        for n in 0u64..8 {
            tree.set(U256::from(n), Hash256::sha256(&n.to_be_bytes()));
        }
        tree.set(key, value);
        (tree, key, value)
    }

    #[test]
    fn test_proof_roundtrip() {
        let (tree, key, _) = populated_tree();
        let proof = tree.create_merkle_proof(key);
        let parsed = SmtProof::from_bytes(&proof.to_bytes()).unwrap();
        assert_eq!(parsed, proof);
    }

    #[test]
    fn test_verify_accepts_honest_proof() {
        let (tree, key, value) = populated_tree();
        let proof = tree.create_merkle_proof(key);
        assert!(verify(&tree.root(), key, &value, &proof.to_bytes()));
    }

    #[test]
    fn test_verify_rejects_wrong_value() {
        let (tree, key, _) = populated_tree();
        let proof = tree.create_merkle_proof(key);
        let wrong = Hash256::sha256(b"other leaf");
        assert!(!verify(&tree.root(), key, &wrong, &proof.to_bytes()));
    }

    #[test]
    fn test_verify_rejects_bit_flips() {
        let (tree, key, value) = populated_tree();
        let bytes = tree.create_merkle_proof(key).to_bytes();
        for i in 0..bytes.len() {
            let mut mutated = bytes.clone();
            mutated[i] ^= 0x01;
            assert!(
                !verify(&tree.root(), key, &value, &mutated),
                "bit flip at byte {i} still verified"
            );
        }
    }

    #[test]
    fn test_verify_rejects_truncated_and_padded() {
        let (tree, key, value) = populated_tree();
        let bytes = tree.create_merkle_proof(key).to_bytes();

        assert!(!verify(&tree.root(), key, &value, &bytes[..bytes.len() - 1]));
        assert!(!verify(&tree.root(), key, &value, &[]));

        let mut padded = bytes.clone();
        padded.extend_from_slice(&[0u8; 32]);
        assert!(!verify(&tree.root(), key, &value, &padded));
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let (tree, key, value) = populated_tree();
        assert!(!verify(&tree.root(), key, &value, b"\xaa\xaa"));
    }

    #[test]
    fn test_from_bytes_rejects_bitmap_mismatch() {
        let (tree, key, _) = populated_tree();
        let mut bytes = tree.create_merkle_proof(key).to_bytes();
        bytes.extend_from_slice(&[0u8; 32]);
        assert!(SmtProof::from_bytes(&bytes).is_err());
    }
}
