//! The coin registry and checkpoint history
//!
//! The registry is the root-chain side of the two-layer ledger: it mints
//! coins against deposits, tracks the child chain through checkpointed
//! block roots, and answers membership queries against those roots.
//!
//! Mutating operations take `&mut self` and run to completion or fail
//! without touching state; reads take `&self` and may run concurrently
//! under an outer lock. Time never enters this module: only the exit game
//! consumes it, and always as an explicit argument.

use crate::assets::AssetLedger;
use crate::coin::{Coin, CoinState};
use crate::config::{Config, CHILD_BLOCK_INTERVAL};
use crate::error::{LedgerError, LedgerResult};
use crate::event::Event;
use crate::exit::ExitRecord;
use plasma_primitives::{slot, Address, Hash256, Slot};
use plasma_tx::deposit_tx_hash;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A checkpointed child-chain block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildBlock {
    pub height: u64,
    pub root: Hash256,
}

/// The root-chain ledger state.
pub struct RootChain<A> {
    /// The custody account holding deposited value.
    pub(crate) address: Address,
    pub(crate) assets: A,
    pub(crate) config: Option<Config>,
    pub(crate) coins: HashMap<Slot, Coin>,
    pub(crate) blocks: BTreeMap<u64, ChildBlock>,
    /// Height of the latest recorded block, deposit or checkpoint.
    pub(crate) current_block: u64,
    pub(crate) deposit_count: u64,
    pub(crate) exits: HashMap<Slot, ExitRecord>,
}

impl<A: AssetLedger> RootChain<A> {
    pub fn new(address: Address, assets: A) -> Self {
        Self {
            address,
            assets,
            config: None,
            coins: HashMap::new(),
            blocks: BTreeMap::new(),
            current_block: 0,
            deposit_count: 0,
            exits: HashMap::new(),
        }
    }

    /// The custody account address.
    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn assets(&self) -> &A {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut A {
        &mut self.assets
    }

    pub fn config(&self) -> Option<&Config> {
        self.config.as_ref()
    }

    pub fn current_block(&self) -> u64 {
        self.current_block
    }

    /// Height the operator's next checkpoint will be assigned.
    pub fn next_checkpoint_height(&self) -> u64 {
        (self.current_block / CHILD_BLOCK_INTERVAL + 1) * CHILD_BLOCK_INTERVAL
    }

    /// Install or replace the configuration.
    ///
    /// The first call may come from anyone (deployment); afterwards only
    /// the current operator may reconfigure.
    pub fn set_config(&mut self, caller: &Address, config: Config) -> LedgerResult<Vec<Event>> {
        if let Some(existing) = &self.config {
            if *caller != existing.operator {
                return Err(LedgerError::NotOperator(caller.clone()));
            }
        }
        tracing::info!(operator = %config.operator, challenge_period = config.challenge_period, "config set");
        let event = Event::new(
            "ConfigSet",
            serde_json::json!({
                "operator": config.operator.as_str(),
                "challengePeriod": config.challenge_period,
            }),
        );
        self.config = Some(config);
        Ok(vec![event])
    }

    pub(crate) fn require_config(&self) -> LedgerResult<&Config> {
        self.config.as_ref().ok_or(LedgerError::NotConfigured)
    }

    /// Accept a deposit: mint a coin and record its single-transaction
    /// deposit block.
    ///
    /// The new coin's denomination and balance both equal the deposited
    /// amount, and the deposit block lands at `current_block + 1`, below
    /// the next checkpoint interval.
    pub fn on_deposit_asset(
        &mut self,
        caller: &Address,
        asset: u32,
        amount: u64,
    ) -> LedgerResult<(Slot, Vec<Event>)> {
        self.require_config()?;
        if amount == 0 {
            return Err(LedgerError::AmountZero);
        }

        let custody = self.address.clone();
        self.assets.transfer(caller, &custody, asset, amount)?;

        let new_slot = self.derive_slot(caller, asset, amount);
        self.deposit_count += 1;

        self.coins.insert(
            new_slot,
            Coin {
                slot: new_slot,
                owner: caller.clone(),
                denomination: amount,
                balance: amount,
                asset,
                state: CoinState::Deposited,
            },
        );

        let height = self.record_deposit_block(new_slot);
        let slot_hex = slot::to_hex(new_slot);
        tracing::info!(slot = %slot_hex, amount, asset, height, "deposit accepted");

        let events = vec![Event::new(
            "Deposited",
            serde_json::json!({
                "slot": slot_hex,
                "owner": caller.as_str(),
                "denomination": amount,
                "asset": asset,
                "depositBlock": height,
            }),
        )];
        Ok((new_slot, events))
    }

    /// Mint a coin with zero denomination and balance, to be funded later
    /// through `provide_liquidity`.
    pub fn create_empty_coin(&mut self, caller: &Address) -> LedgerResult<(Slot, Vec<Event>)> {
        self.require_config()?;

        let new_slot = self.derive_slot(caller, 0, 0);
        self.deposit_count += 1;

        self.coins.insert(
            new_slot,
            Coin {
                slot: new_slot,
                owner: caller.clone(),
                denomination: 0,
                balance: 0,
                asset: 0,
                state: CoinState::Deposited,
            },
        );

        let slot_hex = slot::to_hex(new_slot);
        tracing::info!(slot = %slot_hex, "empty coin created");

        let events = vec![Event::new(
            "CoinCreated",
            serde_json::json!({
                "slot": slot_hex,
                "owner": caller.as_str(),
            }),
        )];
        Ok((new_slot, events))
    }

    /// Assign a denomination to an unfunded empty coin.
    ///
    /// The balance stays zero; it is populated by child-chain activity,
    /// not by this call.
    pub fn provide_liquidity(&mut self, target: Slot, amount: u64) -> LedgerResult<Vec<Event>> {
        self.require_config()?;
        if amount == 0 {
            return Err(LedgerError::AmountZero);
        }

        let slot_hex = slot::to_hex(target);
        let coin = self
            .coins
            .get_mut(&target)
            .ok_or_else(|| LedgerError::UnknownCoin(slot_hex.clone()))?;

        if coin.state != CoinState::Deposited || coin.balance != 0 || coin.denomination != 0 {
            return Err(LedgerError::CoinNotFundable(slot_hex));
        }

        coin.denomination = amount;
        tracing::info!(slot = %slot::to_hex(target), amount, "liquidity provided");

        Ok(vec![Event::new(
            "LiquidityProvided",
            serde_json::json!({
                "slot": slot::to_hex(target),
                "denomination": amount,
            }),
        )])
    }

    /// Append an operator checkpoint.
    ///
    /// Heights are caller-assigned but must be strictly increasing, so a
    /// duplicate or reordered submission is refused.
    pub fn submit_block(
        &mut self,
        caller: &Address,
        root: Hash256,
        height: u64,
    ) -> LedgerResult<Vec<Event>> {
        let config = self.require_config()?;
        if *caller != config.operator {
            return Err(LedgerError::NotOperator(caller.clone()));
        }
        if height <= self.current_block {
            return Err(LedgerError::StaleBlockHeight {
                height,
                current: self.current_block,
            });
        }

        self.blocks.insert(height, ChildBlock { height, root });
        self.current_block = height;
        tracing::info!(height, root = %root, "child block submitted");

        Ok(vec![Event::new(
            "SubmittedBlock",
            serde_json::json!({
                "height": height,
                "root": root.to_hex(),
            }),
        )])
    }

    pub fn get_child_block_by_height(&self, height: u64) -> Option<&ChildBlock> {
        self.blocks.get(&height)
    }

    pub fn get_coin(&self, target: Slot) -> Option<&Coin> {
        self.coins.get(&target)
    }

    /// Whether `tx_hash` sits at `target` under the checkpoint root.
    ///
    /// Pure and side-effect free; a mismatch or garbled proof is a `false`
    /// result, not an error.
    pub fn check_membership(
        &self,
        tx_hash: &Hash256,
        block_root: &Hash256,
        target: Slot,
        proof: &[u8],
    ) -> bool {
        plasma_smt::verify(block_root, target, tx_hash, proof)
    }

    /// A fresh slot for a new coin, derived from the deposit's identity.
    fn derive_slot(&self, caller: &Address, asset: u32, amount: u64) -> Slot {
        let mut payload = Vec::with_capacity(caller.as_str().len() + 20);
        payload.extend_from_slice(caller.as_str().as_bytes());
        payload.extend_from_slice(&asset.to_be_bytes());
        payload.extend_from_slice(&amount.to_be_bytes());
        payload.extend_from_slice(&self.deposit_count.to_be_bytes());
        let digest = Hash256::sha256_with_domain(b"plasma.coin", &payload);
        slot::from_bytes(digest.as_bytes())
    }

    /// Record the single-transaction block holding a deposit.
    fn record_deposit_block(&mut self, target: Slot) -> u64 {
        let root = plasma_smt::single_leaf_root(target, deposit_tx_hash(target));
        let height = self.current_block + 1;
        self.blocks.insert(height, ChildBlock { height, root });
        self.current_block = height;
        height
    }
}
