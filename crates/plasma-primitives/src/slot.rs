//! 256-bit coin slot identifiers
//!
//! A slot is the unique key of a coin: it addresses the coin's position in
//! the sparse Merkle tree and identifies the coin for its whole lifetime.
//! Slots travel in three forms: 64-char hex in event payloads and slot-keyed
//! queries, decimal strings at the argument interface, and raw 32-byte
//! big-endian values inside transaction records.

use primitive_types::U256;
use thiserror::Error;

/// The slot key type: a 256-bit unsigned integer.
pub type Slot = U256;

/// Errors parsing a slot from its transport forms
#[derive(Debug, Error)]
pub enum SlotParseError {
    #[error("invalid slot hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("slot hex longer than 32 bytes: {0} bytes")]
    TooLong(usize),

    #[error("invalid decimal slot: {0}")]
    InvalidDecimal(String),
}

/// Parse a slot from a hex string (with or without `0x`), at most 32 bytes.
pub fn from_hex(hex_str: &str) -> Result<Slot, SlotParseError> {
    let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    // Tolerate odd-length hex by left-padding a nibble.
    let padded;
    let hex_str = if hex_str.len() % 2 == 1 {
        padded = format!("0{hex_str}");
        &padded
    } else {
        hex_str
    };
    let bytes = hex::decode(hex_str)?;
    if bytes.len() > 32 {
        return Err(SlotParseError::TooLong(bytes.len()));
    }
    Ok(U256::from_big_endian(&bytes))
}

/// Format a slot as a 64-char lowercase hex string (no prefix).
pub fn to_hex(slot: Slot) -> String {
    hex::encode(to_bytes(slot))
}

/// Parse a slot from a decimal string.
pub fn from_dec_str(s: &str) -> Result<Slot, SlotParseError> {
    U256::from_dec_str(s.trim()).map_err(|_| SlotParseError::InvalidDecimal(s.to_string()))
}

/// The slot's raw 32-byte big-endian form.
pub fn to_bytes(slot: Slot) -> [u8; 32] {
    let mut buf = [0u8; 32];
    slot.to_big_endian(&mut buf);
    buf
}

/// Build a slot from its raw 32-byte big-endian form.
pub fn from_bytes(bytes: &[u8; 32]) -> Slot {
    U256::from_big_endian(bytes)
}

/// Serde adapter: slots as 64-char hex strings.
pub mod serde_hex {
    use super::*;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(slot: &Slot, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&to_hex(*slot))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Slot, D::Error> {
        let s = String::deserialize(deserializer)?;
        from_hex(&s).map_err(serde::de::Error::custom)
    }
}
