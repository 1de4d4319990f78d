use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Unique, totally ordered account identifier.
///
/// Ordering is plain string comparison; it decides which of two accounts is
/// locked first during a transfer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Generates a fresh random (UUID v4) identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for AccountId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A balance cell guarded by its own lock.
///
/// The balance is only ever read or written through the mutex, so holding the
/// guard is the same thing as owning the balance.
#[derive(Debug)]
pub struct Account {
    id: AccountId,
    balance: Mutex<i64>,
}

impl Account {
    pub fn new(id: impl Into<AccountId>, balance: i64) -> Self {
        Self {
            id: id.into(),
            balance: Mutex::new(balance),
        }
    }

    pub fn id(&self) -> &AccountId {
        &self.id
    }

    /// Reads the balance under the account lock.
    pub async fn balance(&self) -> i64 {
        *self.balance.lock().await
    }

    /// Captures the current state under the account lock.
    pub async fn snapshot(&self) -> AccountSnapshot {
        AccountSnapshot {
            id: self.id.clone(),
            balance: self.balance().await,
        }
    }

    pub(crate) fn lock_cell(&self) -> &Mutex<i64> {
        &self.balance
    }

    /// Position of this account in the global lock order.
    ///
    /// Ids decide; two distinct accounts sharing an id fall back to their
    /// address so the order stays total.
    pub(crate) fn locks_before(&self, other: &Account) -> bool {
        match self.id.cmp(&other.id) {
            std::cmp::Ordering::Equal => {
                (self as *const Account as usize) < (other as *const Account as usize)
            }
            ordering => ordering.is_lt(),
        }
    }
}

/// Point-in-time view of an account, used for reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub id: AccountId,
    pub balance: i64,
}
