use crate::domain::account::AccountId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("At least 2 accounts are required to pick a transfer pair")]
    InsufficientAccounts,
    #[error("All workers exited after {succeeded} of {target} transfers")]
    PoolExhausted { succeeded: usize, target: usize },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a single transfer attempt did not commit.
///
/// None of these are fatal: the engine reports them as a failed transfer and
/// leaves both accounts untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("Invalid transfer: {0}")]
    InvalidArgument(String),
    #[error("Could not acquire lock on account {account} within timeout")]
    LockTimeout { account: AccountId },
    #[error("Insufficient funds in {account}: available {available}, requested {requested}")]
    InsufficientFunds {
        account: AccountId,
        available: i64,
        requested: i64,
    },
    #[error("Transfer cancelled while waiting")]
    Cancelled,
    #[error("Unexpected fault: {0}")]
    Fault(String),
}

pub type Result<T> = std::result::Result<T, SimulationError>;
