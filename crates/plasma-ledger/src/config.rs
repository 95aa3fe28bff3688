//! Deployment configuration

use plasma_primitives::Address;
use serde::{Deserialize, Serialize};

/// Heights of operator-submitted checkpoints step by this interval, leaving
/// the gaps in between for deposit blocks.
pub const CHILD_BLOCK_INTERVAL: u64 = 1000;

/// A reference to a collaborating contract, resolved by the VM.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractRef(String);

impl ContractRef {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContractRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The ledger's deployment configuration.
///
/// Set once via `set_config`; afterwards only the operator may replace it.
/// The value itself is public and read via `get_config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// The child-chain operator, the only account allowed to checkpoint.
    pub operator: Address,
    /// The validator-manager contract.
    pub validator_manager: ContractRef,
    /// The sparse-Merkle-tree service contract.
    pub merkle_tree_service: ContractRef,
    /// How long an exit stays challengeable, in the chain's time unit.
    pub challenge_period: u64,
}
