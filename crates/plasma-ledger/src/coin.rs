//! Coin records

use plasma_primitives::{slot, Address, Slot};
use serde::{Deserialize, Serialize};

/// Where a coin stands in its root-chain lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoinState {
    /// Custodied on the root chain, live on the child chain.
    Deposited,
    /// An exit has been started for the coin.
    Exiting,
    /// The exit was finalized; value awaits withdrawal.
    Exited,
    /// The value returned to its owner; the slot is retired.
    Withdrawn,
}

/// A coin tracked by the registry.
///
/// `denomination` is the face value fixed at creation or liquidity
/// provision; `balance` is the spendable value and never exceeds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coin {
    #[serde(with = "slot::serde_hex")]
    pub slot: Slot,
    pub owner: Address,
    pub denomination: u64,
    pub balance: u64,
    pub asset: u32,
    pub state: CoinState,
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitive_types::U256;

    #[test]
    fn test_coin_json_shape() {
        let coin = Coin {
            slot: U256::from(0x42u64),
            owner: Address::new("alice"),
            denomination: 50_000,
            balance: 50_000,
            asset: 0,
            state: CoinState::Deposited,
        };
        let json = serde_json::to_value(&coin).unwrap();
        assert_eq!(json["denomination"], 50_000);
        assert_eq!(json["balance"], 50_000);
        assert_eq!(json["state"], "Deposited");
        assert_eq!(json["slot"].as_str().unwrap().len(), 64);
    }
}
