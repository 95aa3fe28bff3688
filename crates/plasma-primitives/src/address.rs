//! Root-chain account identifiers
//!
//! Addresses are opaque strings to the ledger: base-layer accounts keep
//! whatever form the chain assigns them, while identities recovered from a
//! public key use the `ADDR_`-prefixed compressed-point form produced by
//! `plasma-keys`.

use serde::{Deserialize, Serialize};

/// An opaque root-chain account identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self(s)
    }
}
