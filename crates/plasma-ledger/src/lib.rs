//! The root-chain ledger: coin registry, checkpoint history, and exit game
//!
//! The ledger custodies deposited value and tracks the child chain through
//! checkpointed block roots. Coin owners exit through a timed
//! challenge-response protocol; everything here is a deterministic state
//! machine driven by explicit callers and an externally supplied notion of
//! current time: no clocks, timers, or background work.
//!
//! The contract-API surface (`PlasmaModule`) speaks the chain's
//! string-argument dispatch convention through the [`ContractInvoker`]
//! capability trait and returns an [`InvokeReceipt`] carrying the
//! operation's result and its append-only event log.

pub mod assets;
pub mod coin;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod exit;
pub mod invoke;
pub mod registry;

pub use assets::{AssetLedger, InMemoryAssetLedger};
pub use coin::{Coin, CoinState};
pub use config::{Config, ContractRef, CHILD_BLOCK_INTERVAL};
pub use dispatch::PlasmaModule;
pub use error::LedgerError;
pub use event::Event;
pub use exit::{Challenge, ExitRecord, ExitState, StartExitParams};
pub use invoke::{CallContext, ContractInvoker, InvokeReceipt};
pub use registry::{ChildBlock, RootChain};
