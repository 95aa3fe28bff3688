//! The contract-invocation capability boundary
//!
//! The surrounding chain calls contract APIs by name with comma-joined
//! string arguments. The ledger depends only on this interface, never on
//! VM internals, and implements it for its own module; anything the
//! ledger would ask of collaborating contracts flows through the same
//! seam.

use crate::config::ContractRef;
use crate::error::LedgerError;
use crate::event::Event;
use plasma_primitives::Address;
use serde::Serialize;

/// Ambient facts about the invocation: who calls, what value rides along,
/// and the chain's current time. Time only ever enters the ledger here.
#[derive(Debug, Clone)]
pub struct CallContext {
    pub caller: Address,
    /// Asset carried by the call (deposits).
    pub asset: u32,
    /// Value carried by the call (deposits).
    pub value: u64,
    /// The chain's notion of current time.
    pub now: u64,
}

impl CallContext {
    pub fn new(caller: Address, asset: u32, value: u64, now: u64) -> Self {
        Self {
            caller,
            asset,
            value,
            now,
        }
    }
}

/// The outcome of one invocation: the API's string result, the events it
/// emitted, and whether execution succeeded.
#[derive(Debug, Clone, Serialize)]
pub struct InvokeReceipt {
    pub api_result: String,
    pub events: Vec<Event>,
    pub exec_succeed: bool,
}

impl InvokeReceipt {
    pub fn ok(api_result: impl Into<String>, events: Vec<Event>) -> Self {
        Self {
            api_result: api_result.into(),
            events,
            exec_succeed: true,
        }
    }

    /// A failed execution: the error message becomes the result, nothing
    /// is emitted.
    pub fn fail(err: &LedgerError) -> Self {
        Self {
            api_result: err.to_string(),
            events: Vec::new(),
            exec_succeed: false,
        }
    }
}

/// Invoke contract APIs by name with string arguments.
pub trait ContractInvoker {
    /// Run a state-mutating API inside a transaction context.
    fn invoke(
        &mut self,
        ctx: &CallContext,
        contract: &ContractRef,
        api: &str,
        arg: &str,
    ) -> InvokeReceipt;

    /// Run a read-only API against current state. Safe to call
    /// concurrently; never observes a partially applied mutation.
    fn invoke_offline(&self, contract: &ContractRef, api: &str, arg: &str) -> InvokeReceipt;
}
