//! Plasma Cash root-chain ledger.
//!
//! This crate ties together the subsystems of a two-layer ledger: a root
//! chain that custodies deposited value and a child chain whose per-block
//! transaction roots are periodically checkpointed on the root chain. Coin
//! owners can always withdraw their funds back to the root chain through a
//! timed exit/challenge protocol, without trusting the child-chain operator.
//!
//! # Crates
//!
//! - `plasma-primitives`: hashes, 256-bit slot keys, addresses
//! - `plasma-smt`: fixed-depth sparse Merkle tree and inclusion proofs
//! - `plasma-tx`: canonical child-chain transaction codec
//! - `plasma-keys`: recoverable secp256k1 signatures
//! - `plasma-ledger`: coin registry, checkpoint history, and exit game
//!
//! # Example
//!
//! ```no_run
//! use plasma_ledger::{CallContext, ContractInvoker, PlasmaModule};
//! use plasma_primitives::Address;
//!
//! let mut module = PlasmaModule::with_in_memory_assets(Address::new("plasma1"));
//! let contract = module.contract_ref().clone();
//! let ctx = CallContext::new(Address::new("alice"), 0, 50_000, 1);
//! let receipt = module.invoke(&ctx, &contract, "on_deposit_asset", "");
//! println!("slot: {}", receipt.api_result);
//! ```

// Re-export sub-crates
pub use plasma_keys as keys;
pub use plasma_ledger as ledger;
pub use plasma_primitives as primitives;
pub use plasma_smt as smt;
pub use plasma_tx as tx;
