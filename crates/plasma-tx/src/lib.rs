//! Child-chain transaction records and their canonical codec
//!
//! A transaction's byte form is used both for transport and as the
//! pre-image of its hash, so the encoding is canonical: fixed field order,
//! fixed widths, and every field always present: two semantically equal
//! records encode identically. Decoding is the strict inverse; byte
//! sequences the encoder could not have produced are rejected.

mod codec;
mod error;
mod tx;

pub use codec::{decode, encode, CODEC_VERSION};
pub use error::CodecError;
pub use tx::{deposit_tx_hash, ChildChainTx};
