use crate::domain::account::Account;
use crate::domain::ports::TransferService;
use crate::domain::signal::Signal;
use crate::error::TransferError;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::MutexGuard;
use tracing::{error, info, warn};

pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(1);

/// Moves funds between two accounts under both of their locks.
///
/// Locks are always taken in account-id order regardless of the transfer
/// direction, and each acquisition is bounded by `lock_timeout`, so two
/// opposite transfers over the same pair can never wait on each other forever.
/// The engine holds no state of its own; it only touches the two accounts it
/// is handed.
#[derive(Debug, Clone)]
pub struct TransferEngine {
    lock_timeout: Duration,
}

impl Default for TransferEngine {
    fn default() -> Self {
        Self::new(DEFAULT_LOCK_TIMEOUT)
    }
}

impl TransferEngine {
    /// Creates an engine whose lock waits give up after `lock_timeout`.
    pub fn new(lock_timeout: Duration) -> Self {
        Self { lock_timeout }
    }

    pub fn lock_timeout(&self) -> Duration {
        self.lock_timeout
    }

    fn validate(from: &Account, to: &Account, amount: i64) -> Result<(), TransferError> {
        if std::ptr::eq(from, to) {
            return Err(TransferError::InvalidArgument(format!(
                "cannot transfer from account {} to itself",
                from.id()
            )));
        }
        if amount < 0 {
            return Err(TransferError::InvalidArgument(format!(
                "amount is negative: {amount}"
            )));
        }
        Ok(())
    }

    /// Waits for `account`'s lock, giving up on timeout or cancellation.
    async fn acquire<'a>(
        &self,
        account: &'a Account,
        cancel: &Signal,
    ) -> Result<MutexGuard<'a, i64>, TransferError> {
        tokio::select! {
            biased;
            _ = cancel.fired() => Err(TransferError::Cancelled),
            guard = tokio::time::timeout(self.lock_timeout, account.lock_cell().lock()) => {
                guard.map_err(|_| TransferError::LockTimeout {
                    account: account.id().clone(),
                })
            }
        }
    }

    async fn execute(
        &self,
        from: &Account,
        to: &Account,
        amount: i64,
        cancel: &Signal,
    ) -> Result<(), TransferError> {
        Self::validate(from, to, amount)?;

        let from_first = from.locks_before(to);
        let (first, second) = if from_first { (from, to) } else { (to, from) };

        // Guards release on every return path below, including `?`.
        let first_guard = self.acquire(first, cancel).await?;
        let second_guard = self.acquire(second, cancel).await?;
        let (mut source, mut target) = if from_first {
            (first_guard, second_guard)
        } else {
            (second_guard, first_guard)
        };

        if *source < amount {
            return Err(TransferError::InsufficientFunds {
                account: from.id().clone(),
                available: *source,
                requested: amount,
            });
        }
        let credited = target.checked_add(amount).ok_or_else(|| {
            TransferError::Fault(format!("balance overflow crediting account {}", to.id()))
        })?;
        *source -= amount;
        *target = credited;

        info!(
            amount,
            from = %from.id(),
            to = %to.id(),
            from_balance = *source,
            to_balance = *target,
            "Transfer succeeded"
        );
        Ok(())
    }
}

#[async_trait]
impl TransferService for TransferEngine {
    async fn try_transfer(
        &self,
        from: &Account,
        to: &Account,
        amount: i64,
        cancel: &Signal,
    ) -> Result<(), TransferError> {
        let result = self.execute(from, to, amount, cancel).await;
        if let Err(err) = &result {
            match err {
                TransferError::InsufficientFunds {
                    account,
                    available,
                    requested,
                } => info!(
                    %account,
                    missing = requested - available,
                    "Transfer failed: insufficient funds"
                ),
                TransferError::LockTimeout { account } => {
                    warn!(%account, "Transfer failed: lock not acquired within timeout")
                }
                TransferError::InvalidArgument(reason) => warn!("Transfer failed: {reason}"),
                TransferError::Cancelled => warn!(
                    from = %from.id(),
                    to = %to.id(),
                    amount,
                    "Transfer cancelled while waiting for locks"
                ),
                TransferError::Fault(reason) => error!(
                    from = %from.id(),
                    to = %to.id(),
                    amount,
                    "Unexpected error during transfer: {reason}"
                ),
            }
        }
        result
    }
}
