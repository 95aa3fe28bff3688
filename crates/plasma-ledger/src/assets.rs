//! The base-layer asset ledger boundary
//!
//! Deposits draw from and withdrawals pay into the root chain's native
//! balances. That ledger is an external collaborator; the registry only
//! needs this minimal interface to it. The in-memory implementation backs
//! tests and the CLI.

use crate::error::LedgerError;
use plasma_primitives::Address;
use std::collections::HashMap;

/// Mint/transfer/balance interface of the base-layer asset ledger.
pub trait AssetLedger {
    fn balance_of(&self, account: &Address, asset: u32) -> u64;

    fn mint(&mut self, account: &Address, asset: u32, amount: u64);

    fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        asset: u32,
        amount: u64,
    ) -> Result<(), LedgerError>;
}

/// A plain in-memory asset ledger.
#[derive(Debug, Default)]
pub struct InMemoryAssetLedger {
    balances: HashMap<(Address, u32), u64>,
}

impl InMemoryAssetLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AssetLedger for InMemoryAssetLedger {
    fn balance_of(&self, account: &Address, asset: u32) -> u64 {
        self.balances
            .get(&(account.clone(), asset))
            .copied()
            .unwrap_or(0)
    }

    fn mint(&mut self, account: &Address, asset: u32, amount: u64) {
        let entry = self.balances.entry((account.clone(), asset)).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        asset: u32,
        amount: u64,
    ) -> Result<(), LedgerError> {
        let available = self.balance_of(from, asset);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                account: from.clone(),
                available,
                required: amount,
            });
        }
        self.balances.insert((from.clone(), asset), available - amount);
        let credit = self.balances.entry((to.clone(), asset)).or_insert(0);
        *credit = credit.saturating_add(amount);
        Ok(())
    }
}
