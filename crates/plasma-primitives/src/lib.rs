//! Plasma Root Chain Primitives
//!
//! This crate provides the shared building blocks of the root-chain ledger:
//! - `Hash256`: SHA-256 digests with hex transport and serde support
//! - `Slot`: 256-bit coin identifiers keyed into the sparse Merkle tree
//! - `Address`: opaque root-chain account identifiers

pub mod address;
pub mod hash;
pub mod slot;

pub use address::Address;
pub use hash::Hash256;
pub use slot::{Slot, SlotParseError};
