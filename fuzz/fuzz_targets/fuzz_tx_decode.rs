//! Fuzz target for transaction decoding
//!
//! This target ensures:
//! 1. Decoding never panics on arbitrary input
//! 2. Accepted bytes re-encode to exactly the input (strict canonicality)

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Decoding must never panic, only return errors.
    if let Ok(tx) = plasma_tx::decode(data) {
        // Anything the decoder accepts must be the canonical encoding of
        // what it produced.
        let reencoded = plasma_tx::encode(&tx);
        assert_eq!(reencoded, data, "decoder accepted a non-canonical form");
    }
});
