//! Error types for ledger operations
//!
//! Two families matter at the API surface: validation errors (malformed or
//! dishonest material presented to a mutating operation) and policy errors
//! (an operation invoked before its preconditions hold). Both surface as a
//! failed-execution receipt with a readable message, never a panic.
//! Pure-query negatives (a membership mismatch, a missing exit) are not
//! errors at all; they are `false`/`null` results.

use plasma_primitives::Address;
use plasma_tx::CodecError;
use thiserror::Error;

/// Errors that can occur during ledger operations
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The ledger has no configuration yet
    #[error("ledger is not configured")]
    NotConfigured,

    /// A caller tried an operator-only operation
    #[error("caller {0} is not the operator")]
    NotOperator(Address),

    /// A zero amount where value must move
    #[error("amount must be positive")]
    AmountZero,

    /// No coin lives at the slot
    #[error("unknown coin {0}")]
    UnknownCoin(String),

    /// `provide_liquidity` on a coin that is not an unfunded empty coin
    #[error("coin {0} cannot take liquidity in its current state")]
    CoinNotFundable(String),

    /// An exit was started for a coin that is not sitting on the root chain
    #[error("coin {0} is not exitable in its current state")]
    CoinNotExitable(String),

    /// Block heights must be strictly increasing
    #[error("block height {height} is not after current height {current}")]
    StaleBlockHeight { height: u64, current: u64 },

    /// No checkpoint was recorded at the height
    #[error("no child block at height {0}")]
    UnknownBlock(u64),

    /// A second `startExit` for a slot already exiting
    #[error("an exit already exists for coin {0}")]
    ExitExists(String),

    /// `finalizeExit`/`withdraw`/challenge operations on a missing exit
    #[error("no exit exists for coin {0}")]
    UnknownExit(String),

    /// `finalizeExit` before the challenge window elapsed
    #[error("exit for coin {slot} is not mature: exitable at {exitable_at}, now {now}")]
    ExitNotMature {
        slot: String,
        exitable_at: u64,
        now: u64,
    },

    /// `withdraw` on an exit that has not been finalized
    #[error("exit for coin {0} is not finalized")]
    ExitNotFinalized(String),

    /// A challenge raised while another is already pending
    #[error("exit for coin {0} already has a pending challenge")]
    ChallengeExists(String),

    /// A response to a challenge that does not exist
    #[error("exit for coin {0} has no pending challenge")]
    NoChallenge(String),

    /// Exit operations restricted to the recorded owner
    #[error("caller {caller} does not own the exit for coin {slot}")]
    NotExitOwner { slot: String, caller: Address },

    /// An inclusion proof that does not verify
    #[error("invalid inclusion proof: {0}")]
    InvalidProof(String),

    /// A signature that does not recover to the claimed owner
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// A transaction inconsistent with the operation it backs
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),

    /// Challenge evidence that does not meet the challenge rules
    #[error("invalid challenge: {0}")]
    InvalidChallenge(String),

    /// A transaction byte sequence the canonical codec rejects
    #[error("transaction decode failed: {0}")]
    Codec(#[from] CodecError),

    /// A transfer the base-layer balances cannot cover
    #[error("insufficient balance: {account} holds {available}, needs {required}")]
    InsufficientBalance {
        account: Address,
        available: u64,
        required: u64,
    },

    /// A malformed argument at the dispatch boundary
    #[error("bad argument: {0}")]
    BadArgument(String),

    /// Serialization of an API result failed
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// An API name this contract does not export
    #[error("unknown contract api {0}")]
    UnknownApi(String),

    /// An invocation addressed to a different contract
    #[error("unknown contract {0}")]
    UnknownContract(String),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
