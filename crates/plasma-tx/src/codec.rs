//! Canonical binary layout
//!
//! ```text
//! version:       u8 (= 1)
//! owner_pub_key: u16 BE length || UTF-8 bytes
//! owner:         u16 BE length || UTF-8 bytes
//! slot:          32 bytes BE
//! balance:       u64 BE
//! prev_block:    u64 BE
//! hash:          32 bytes (zero when unset)
//! sig_hash:      u16 BE length || bytes (empty when unset)
//! ```
//!
//! Every field is always written, explicit zeroes and empties included, so
//! equal records always produce equal bytes. The hash pre-image is the same
//! layout with the `hash` and `sig_hash` fields omitted entirely.

use crate::error::CodecError;
use crate::tx::ChildChainTx;
use plasma_primitives::{slot, Hash256};

/// Version byte leading every encoded transaction.
pub const CODEC_VERSION: u8 = 1;

/// Encode a transaction into its canonical byte form.
pub fn encode(tx: &ChildChainTx) -> Vec<u8> {
    let mut out = Vec::with_capacity(96 + tx.owner_pub_key.len() + tx.owner.len());
    out.push(CODEC_VERSION);
    write_str(&mut out, &tx.owner_pub_key);
    write_str(&mut out, &tx.owner);
    out.extend_from_slice(&slot::to_bytes(tx.slot));
    out.extend_from_slice(&tx.balance.to_be_bytes());
    out.extend_from_slice(&tx.prev_block.to_be_bytes());
    out.extend_from_slice(tx.hash.as_bytes());
    write_bytes(&mut out, &tx.sig_hash);
    out
}

/// The pre-image hashed to derive an ordinary transaction's hash: the
/// canonical layout without the `hash` and `sig_hash` fields.
pub(crate) fn encode_hash_preimage(tx: &ChildChainTx) -> Vec<u8> {
    let mut out = Vec::with_capacity(64 + tx.owner_pub_key.len() + tx.owner.len());
    out.push(CODEC_VERSION);
    write_str(&mut out, &tx.owner_pub_key);
    write_str(&mut out, &tx.owner);
    out.extend_from_slice(&slot::to_bytes(tx.slot));
    out.extend_from_slice(&tx.balance.to_be_bytes());
    out.extend_from_slice(&tx.prev_block.to_be_bytes());
    out
}

/// Decode a canonical byte form, strictly.
///
/// Fails on a version mismatch, truncation, or trailing bytes: a byte
/// sequence the encoder could not have produced is never accepted.
pub fn decode(bytes: &[u8]) -> Result<ChildChainTx, CodecError> {
    let mut cursor = Cursor::new(bytes);

    let version = cursor.read_u8("version")?;
    if version != CODEC_VERSION {
        return Err(CodecError::UnsupportedVersion(version));
    }

    let owner_pub_key = cursor.read_str("owner_pub_key")?;
    let owner = cursor.read_str("owner")?;
    let slot_bytes = cursor.read_array::<32>("slot")?;
    let balance = cursor.read_u64("balance")?;
    let prev_block = cursor.read_u64("prev_block")?;
    let hash = Hash256::from_bytes(cursor.read_array::<32>("hash")?);
    let sig_hash = cursor.read_len_prefixed("sig_hash")?;

    cursor.finish()?;

    Ok(ChildChainTx {
        owner_pub_key,
        owner,
        slot: slot::from_bytes(&slot_bytes),
        balance,
        prev_block,
        hash,
        sig_hash,
    })
}

fn write_str(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(&(s.len() as u16).to_be_bytes());
    out.extend_from_slice(s.as_bytes());
}

fn write_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
    out.extend_from_slice(bytes);
}

struct Cursor<'a> {
    bytes: &'a [u8],
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    fn take(&mut self, n: usize, field: &'static str) -> Result<&'a [u8], CodecError> {
        if self.bytes.len() < n {
            return Err(CodecError::UnexpectedEnd { field });
        }
        let (head, tail) = self.bytes.split_at(n);
        self.bytes = tail;
        Ok(head)
    }

    fn read_u8(&mut self, field: &'static str) -> Result<u8, CodecError> {
        Ok(self.take(1, field)?[0])
    }

    fn read_u16(&mut self, field: &'static str) -> Result<u16, CodecError> {
        let b = self.take(2, field)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn read_u64(&mut self, field: &'static str) -> Result<u64, CodecError> {
        let b = self.take(8, field)?;
        let mut arr = [0u8; 8];
        arr.copy_from_slice(b);
        Ok(u64::from_be_bytes(arr))
    }

    fn read_array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], CodecError> {
        let b = self.take(N, field)?;
        let mut arr = [0u8; N];
        arr.copy_from_slice(b);
        Ok(arr)
    }

    fn read_len_prefixed(&mut self, field: &'static str) -> Result<Vec<u8>, CodecError> {
        let len = self.read_u16(field)? as usize;
        Ok(self.take(len, field)?.to_vec())
    }

    fn read_str(&mut self, field: &'static str) -> Result<String, CodecError> {
        let bytes = self.read_len_prefixed(field)?;
        String::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8 { field })
    }

    fn finish(&self) -> Result<(), CodecError> {
        if self.bytes.is_empty() {
            Ok(())
        } else {
            Err(CodecError::TrailingBytes(self.bytes.len()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitive_types::U256;

    fn sample_tx() -> ChildChainTx {
        ChildChainTx::new(
            "02e9e0da80e519c937294e7d9ed26786e25a6f6adbdf9952de8e9b2c68b0644c6c",
            "SPLtest1",
            U256::from(0x0190u64),
            50_000,
            1000,
        )
        .seal()
    }

    #[test]
    fn test_roundtrip() {
        let tx = sample_tx();
        let decoded = decode(&encode(&tx)).unwrap();
        assert_eq!(decoded, tx);
    }

    #[test]
    fn test_roundtrip_unsealed() {
        // Zero hash and empty sig_hash are encoded explicitly, not skipped.
        let tx = ChildChainTx::new("pk", "alice", U256::zero(), 0, 0);
        let decoded = decode(&encode(&tx)).unwrap();
        assert_eq!(decoded, tx);
    }

    #[test]
    fn test_equal_records_encode_identically() {
        assert_eq!(encode(&sample_tx()), encode(&sample_tx()));
    }

    #[test]
    fn test_decode_rejects_truncation() {
        let bytes = encode(&sample_tx());
        for cut in 0..bytes.len() {
            assert!(
                decode(&bytes[..cut]).is_err(),
                "decode accepted a {cut}-byte prefix"
            );
        }
    }

    #[test]
    fn test_decode_rejects_trailing_bytes() {
        let mut bytes = encode(&sample_tx());
        bytes.push(0);
        assert_eq!(decode(&bytes), Err(CodecError::TrailingBytes(1)));
    }

    #[test]
    fn test_decode_rejects_bad_version() {
        let mut bytes = encode(&sample_tx());
        bytes[0] = 9;
        assert_eq!(decode(&bytes), Err(CodecError::UnsupportedVersion(9)));
    }

    #[test]
    fn test_decode_rejects_bad_utf8() {
        let mut bytes = encode(&ChildChainTx::new("ab", "cd", U256::zero(), 0, 0));
        // Corrupt the first byte of owner_pub_key ("ab" sits after the
        // version byte and its 2-byte length prefix).
        bytes[3] = 0xff;
        assert!(matches!(
            decode(&bytes),
            Err(CodecError::InvalidUtf8 { field: "owner_pub_key" })
        ));
    }

    #[test]
    fn test_hash_preimage_excludes_seal_fields() {
        let sealed = sample_tx();
        let mut resealed = sealed.clone();
        resealed.sig_hash = vec![0xde, 0xad];
        assert_eq!(
            encode_hash_preimage(&sealed),
            encode_hash_preimage(&resealed)
        );
        assert_ne!(encode(&sealed), encode(&resealed));
    }
}
