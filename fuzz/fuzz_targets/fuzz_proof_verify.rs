//! Fuzz target for inclusion-proof verification
//!
//! This target ensures:
//! 1. Verification never panics, whatever the proof bytes
//! 2. Mutations of an honest proof never verify against the same root

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use plasma_primitives::Hash256;
use plasma_smt::SparseMerkleTree;
use primitive_types::U256;

#[derive(Debug, Arbitrary)]
struct ProofInput {
    key: [u8; 32],
    value: [u8; 32],
    /// Raw bytes to try as a proof
    proof: Vec<u8>,
    /// Whether to splice the junk into an honest proof
    splice: bool,
}

fuzz_target!(|input: ProofInput| {
    let key = U256::from_big_endian(&input.key);
    let value = Hash256::from_bytes(input.value);

    let mut tree = SparseMerkleTree::new();
    let root = tree.set(key, value);

    // Limit proof size to avoid OOM.
    let junk: Vec<u8> = input.proof.into_iter().take(16_384).collect();

    // Verification must never panic, even with garbage input.
    let _ = plasma_smt::verify(&root, key, &value, &junk);

    if input.splice && !junk.is_empty() {
        // Overlay the junk onto an honest proof: unless the bytes are
        // unchanged, verification must fail.
        let honest = tree.create_merkle_proof(key).to_bytes();
        let mut spliced = honest.clone();
        for (i, byte) in junk.iter().enumerate().take(spliced.len()) {
            spliced[i] = *byte;
        }
        if spliced != honest {
            assert!(
                !plasma_smt::verify(&root, key, &value, &spliced),
                "mutated proof verified"
            );
        }
    }
});
