//! The child-chain transaction record

use crate::codec;
use plasma_primitives::{slot, Hash256, Slot};
use serde::{Deserialize, Serialize};

/// A coin transaction on the child chain.
///
/// `prev_block == 0` marks a deposit transaction: the first entry in a
/// coin's history, whose hash is a function of the slot alone (the
/// depositor has not signed anything yet). Every later transaction spends
/// the coin from the block named by `prev_block`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildChainTx {
    /// Hex of the owner's compressed secp256k1 public key.
    pub owner_pub_key: String,
    /// The owner's root-chain address.
    pub owner: String,
    /// The coin being moved.
    #[serde(with = "slot::serde_hex")]
    pub slot: Slot,
    /// Coin balance moved by this transaction.
    pub balance: u64,
    /// Block height of the previous transaction on this coin (0 = deposit).
    pub prev_block: u64,
    /// Canonical transaction hash; zero until sealed.
    pub hash: Hash256,
    /// The signed payload; empty until sealed.
    #[serde(with = "hex_bytes")]
    pub sig_hash: Vec<u8>,
}

impl ChildChainTx {
    /// A new unsealed transaction (hash and sig_hash still empty).
    pub fn new(
        owner_pub_key: impl Into<String>,
        owner: impl Into<String>,
        slot: Slot,
        balance: u64,
        prev_block: u64,
    ) -> Self {
        Self {
            owner_pub_key: owner_pub_key.into(),
            owner: owner.into(),
            slot,
            balance,
            prev_block,
            hash: Hash256::zero(),
            sig_hash: Vec::new(),
        }
    }

    /// Whether this is a deposit transaction.
    pub fn is_deposit(&self) -> bool {
        self.prev_block == 0
    }

    /// The canonical hash of this record.
    ///
    /// Ordinary transactions hash their encoding without the `hash` and
    /// `sig_hash` fields; a deposit's hash is derived from the slot alone.
    pub fn compute_hash(&self) -> Hash256 {
        if self.is_deposit() {
            deposit_tx_hash(self.slot)
        } else {
            Hash256::sha256(&codec::encode_hash_preimage(self))
        }
    }

    /// The payload a signature commits to.
    ///
    /// Spends sign `0x00 || hash`; deposits sign the bare hash.
    pub fn signing_payload(&self) -> Vec<u8> {
        if self.is_deposit() {
            self.hash.as_bytes().to_vec()
        } else {
            let mut payload = Vec::with_capacity(33);
            payload.push(0x00);
            payload.extend_from_slice(self.hash.as_bytes());
            payload
        }
    }

    /// The 32-byte digest actually signed: deposits sign their hash
    /// directly, spends sign the digest of the prefixed payload.
    pub fn signing_digest(&self) -> Hash256 {
        if self.is_deposit() {
            self.hash
        } else {
            Hash256::sha256(&self.signing_payload())
        }
    }

    /// Fill in `hash` and `sig_hash` from the record's content.
    pub fn seal(mut self) -> Self {
        self.hash = self.compute_hash();
        self.sig_hash = self.signing_payload();
        self
    }
}

/// Hash of the deposit transaction for `slot`.
///
/// Deposits are self-identifying: the hash depends on the slot and nothing
/// else, so the coin's first history entry exists before any signature.
pub fn deposit_tx_hash(slot: Slot) -> Hash256 {
    Hash256::sha256(&slot::to_bytes(slot))
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}
