use super::account::Account;
use super::signal::Signal;
use crate::error::TransferError;
use async_trait::async_trait;
use std::sync::Arc;

/// Moves funds between two accounts.
///
/// Implementations must leave both accounts untouched on every `Err`.
#[async_trait]
pub trait TransferService: Send + Sync {
    /// Attempts one transfer, aborting any lock wait once `cancel` fires.
    async fn try_transfer(
        &self,
        from: &Account,
        to: &Account,
        amount: i64,
        cancel: &Signal,
    ) -> Result<(), TransferError>;

    /// Collapses `try_transfer` to a plain success flag, with no cancellation.
    async fn transfer(&self, from: &Account, to: &Account, amount: i64) -> bool {
        self.try_transfer(from, to, amount, &Signal::new())
            .await
            .is_ok()
    }
}

pub type TransferServiceBox = Box<dyn TransferService>;
pub type SharedTransferService = Arc<dyn TransferService>;
