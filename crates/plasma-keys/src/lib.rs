//! Recoverable secp256k1 signatures for proof-of-ownership
//!
//! Ownership artifacts are produced Ethereum-style (`r || s || recovery-id`)
//! by wallet tooling and consumed by the ledger in the chain's consensus
//! layout (`header || r || s`); both carry the same 65 bytes, so conversion
//! is a pure re-layout with no curve arithmetic. Verification recovers the
//! signer's public key from the digest and signature alone.

mod signature;

pub use signature::{
    address_from_public_key, public_key_hex, recover_public_key, sign_recoverable,
    signing_key_from_hex, verify_address, ConsensusSignature, EthSignature, KeyError,
    SIGNATURE_LEN,
};
