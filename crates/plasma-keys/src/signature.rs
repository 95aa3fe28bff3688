//! Signature formats, signing, and public-key recovery

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use plasma_primitives::{Address, Hash256};
use thiserror::Error;

/// Both signature layouts are 65 bytes.
pub const SIGNATURE_LEN: usize = 65;

/// Consensus-layout recovery headers are `31 + recovery_id`.
const CONSENSUS_HEADER_BASE: u8 = 31;

/// Errors handling signatures and keys
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("signature must be {SIGNATURE_LEN} bytes, got {0}")]
    InvalidLength(usize),

    #[error("invalid signature hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("invalid recovery id {0}")]
    InvalidRecoveryId(u8),

    #[error("invalid private key")]
    InvalidPrivateKey,

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("public key recovery failed: {0}")]
    Recovery(String),
}

/// An Ethereum-style recoverable signature: `r(32) || s(32) || recovery_id(1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthSignature([u8; SIGNATURE_LEN]);

impl EthSignature {
    /// Parse from raw bytes. Recovery ids 27/28 (legacy form) are
    /// normalized to 0/1.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != SIGNATURE_LEN {
            return Err(KeyError::InvalidLength(bytes.len()));
        }
        let mut arr = [0u8; SIGNATURE_LEN];
        arr.copy_from_slice(bytes);
        arr[64] = match arr[64] {
            v @ 0..=3 => v,
            v @ 27..=30 => v - 27,
            v => return Err(KeyError::InvalidRecoveryId(v)),
        };
        Ok(Self(arr))
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        Self::from_bytes(&hex::decode(hex_str)?)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }

    pub fn r(&self) -> &[u8] {
        &self.0[..32]
    }

    pub fn s(&self) -> &[u8] {
        &self.0[32..64]
    }

    pub fn recovery_id(&self) -> u8 {
        self.0[64]
    }

    /// Re-layout into the consensus format. Pure byte movement.
    pub fn to_consensus(&self) -> ConsensusSignature {
        let mut out = [0u8; SIGNATURE_LEN];
        out[0] = CONSENSUS_HEADER_BASE + self.recovery_id();
        out[1..].copy_from_slice(&self.0[..64]);
        ConsensusSignature(out)
    }
}

/// The chain's consensus signature layout: `header(1) || r(32) || s(32)`
/// with `header = 31 + recovery_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsensusSignature([u8; SIGNATURE_LEN]);

impl ConsensusSignature {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != SIGNATURE_LEN {
            return Err(KeyError::InvalidLength(bytes.len()));
        }
        let header = bytes[0];
        if !(CONSENSUS_HEADER_BASE..CONSENSUS_HEADER_BASE + 4).contains(&header) {
            return Err(KeyError::InvalidRecoveryId(header));
        }
        let mut arr = [0u8; SIGNATURE_LEN];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        Self::from_bytes(&hex::decode(hex_str)?)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }

    /// Re-layout into the Ethereum format. Pure byte movement.
    pub fn to_eth(&self) -> EthSignature {
        let mut out = [0u8; SIGNATURE_LEN];
        out[..64].copy_from_slice(&self.0[1..]);
        out[64] = self.0[0] - CONSENSUS_HEADER_BASE;
        EthSignature(out)
    }
}

/// Sign a 32-byte digest, producing an Ethereum-layout signature.
pub fn sign_recoverable(key: &SigningKey, digest: &Hash256) -> Result<EthSignature, KeyError> {
    let (signature, recovery_id) = key
        .sign_prehash_recoverable(digest.as_bytes())
        .map_err(|e| KeyError::Signing(e.to_string()))?;
    let mut out = [0u8; SIGNATURE_LEN];
    out[..64].copy_from_slice(signature.to_bytes().as_slice());
    out[64] = recovery_id.to_byte();
    Ok(EthSignature(out))
}

/// Recover the signer's public key from a digest and signature.
pub fn recover_public_key(
    digest: &Hash256,
    signature: &EthSignature,
) -> Result<VerifyingKey, KeyError> {
    let sig = Signature::from_slice(&signature.0[..64])
        .map_err(|e| KeyError::Recovery(e.to_string()))?;
    let recovery_id = RecoveryId::from_byte(signature.recovery_id())
        .ok_or(KeyError::InvalidRecoveryId(signature.recovery_id()))?;
    VerifyingKey::recover_from_prehash(digest.as_bytes(), &sig, recovery_id)
        .map_err(|e| KeyError::Recovery(e.to_string()))
}

/// Hex of a public key's 33-byte compressed SEC1 encoding.
pub fn public_key_hex(key: &VerifyingKey) -> String {
    hex::encode(key.to_encoded_point(true).as_bytes())
}

/// The root-chain address form of a public key.
pub fn address_from_public_key(key: &VerifyingKey) -> Address {
    Address::new(format!("ADDR_{}", public_key_hex(key)))
}

/// Whether `signature` over `digest` recovers to `expected`.
///
/// Adversarial input yields `false`, never an error.
pub fn verify_address(digest: &Hash256, signature: &EthSignature, expected: &Address) -> bool {
    match recover_public_key(digest, signature) {
        Ok(key) => address_from_public_key(&key) == *expected,
        Err(_) => false,
    }
}

/// Parse a signing key from its 32-byte hex form.
pub fn signing_key_from_hex(hex_str: &str) -> Result<SigningKey, KeyError> {
    let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    let bytes = hex::decode(hex_str)?;
    SigningKey::from_slice(&bytes).map_err(|_| KeyError::InvalidPrivateKey)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> SigningKey {
        // Fixed key: tests stay deterministic.
        signing_key_from_hex("4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318")
            .unwrap()
    }

    #[test]
    fn test_sign_and_recover() {
        let key = test_key();
        let digest = Hash256::sha256(b"message");
        let signature = sign_recoverable(&key, &digest).unwrap();

        let recovered = recover_public_key(&digest, &signature).unwrap();
        assert_eq!(&recovered, key.verifying_key());
    }

    #[test]
    fn test_verify_address() {
        let key = test_key();
        let digest = Hash256::sha256(b"message");
        let signature = sign_recoverable(&key, &digest).unwrap();
        let address = address_from_public_key(key.verifying_key());

        assert!(verify_address(&digest, &signature, &address));
        assert!(!verify_address(
            &Hash256::sha256(b"other message"),
            &signature,
            &address
        ));
        assert!(!verify_address(&digest, &signature, &Address::new("ADDR_00")));
    }

    #[test]
    fn test_layout_conversion_roundtrip() {
        let key = test_key();
        let digest = Hash256::sha256(b"message");
        let eth = sign_recoverable(&key, &digest).unwrap();

        let consensus = eth.to_consensus();
        assert_eq!(consensus.as_bytes()[0], 31 + eth.recovery_id());
        assert_eq!(consensus.to_eth(), eth);
    }

    #[test]
    fn test_conversion_moves_bytes_only() {
        let key = test_key();
        let digest = Hash256::sha256(b"message");
        let eth = sign_recoverable(&key, &digest).unwrap();
        let consensus = eth.to_consensus();

        assert_eq!(&consensus.as_bytes()[1..33], eth.r());
        assert_eq!(&consensus.as_bytes()[33..], eth.s());
    }

    #[test]
    fn test_legacy_recovery_id_normalized() {
        let key = test_key();
        let digest = Hash256::sha256(b"message");
        let signature = sign_recoverable(&key, &digest).unwrap();

        let mut legacy = *signature.as_bytes();
        legacy[64] += 27;
        let parsed = EthSignature::from_bytes(&legacy).unwrap();
        assert_eq!(parsed, signature);
    }

    #[test]
    fn test_rejects_bad_lengths_and_headers() {
        assert!(matches!(
            EthSignature::from_bytes(&[0u8; 64]),
            Err(KeyError::InvalidLength(64))
        ));
        assert!(matches!(
            EthSignature::from_bytes(&[9u8; 65]),
            Err(KeyError::InvalidRecoveryId(9))
        ));
        let mut bad_header = [0u8; 65];
        bad_header[0] = 40;
        assert!(ConsensusSignature::from_bytes(&bad_header).is_err());
    }

    #[test]
    fn test_address_form() {
        let key = test_key();
        let address = address_from_public_key(key.verifying_key());
        assert!(address.as_str().starts_with("ADDR_"));
        // "ADDR_" + 33 compressed bytes in hex
        assert_eq!(address.as_str().len(), 5 + 66);
    }
}
