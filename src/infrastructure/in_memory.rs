use crate::domain::account::{Account, AccountId, AccountSnapshot};
use crate::error::{Result, SimulationError};
use rand::Rng;

/// The fixed, in-memory set of accounts a simulation runs against.
///
/// Membership never changes after construction, so concurrent readers need no
/// synchronization here; each account guards its own balance.
#[derive(Debug)]
pub struct AccountRegistry {
    accounts: Vec<Account>,
}

impl AccountRegistry {
    /// Creates `count` accounts with generated ids, each holding `initial_balance`.
    pub fn create(count: usize, initial_balance: i64) -> Result<Self> {
        let accounts = (0..count)
            .map(|_| Account::new(AccountId::generate(), initial_balance))
            .collect();
        Self::from_accounts(accounts)
    }

    /// Wraps pre-built accounts. At least two are required.
    pub fn from_accounts(accounts: Vec<Account>) -> Result<Self> {
        if accounts.len() < 2 {
            return Err(SimulationError::InvalidConfiguration(format!(
                "at least 2 accounts are required, got {}",
                accounts.len()
            )));
        }
        Ok(Self { accounts })
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.accounts.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Account> {
        self.accounts.get(index)
    }

    /// Uniformly random account.
    pub fn pick_random<R: Rng + ?Sized>(&self, rng: &mut R) -> &Account {
        &self.accounts[rng.gen_range(0..self.accounts.len())]
    }

    /// Uniformly random account other than `exclude`.
    ///
    /// When `exclude` belongs to this registry the draw is taken over the
    /// remaining `len - 1` accounts; otherwise every account is eligible.
    pub fn pick_random_excluding<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        exclude: &Account,
    ) -> Result<&Account> {
        if self.accounts.len() < 2 {
            return Err(SimulationError::InsufficientAccounts);
        }
        let Some(excluded) = self.position(exclude) else {
            return Ok(self.pick_random(rng));
        };
        let mut index = rng.gen_range(0..self.accounts.len() - 1);
        if index >= excluded {
            index += 1;
        }
        Ok(&self.accounts[index])
    }

    /// Captures every account in registry order, locking each one in turn.
    pub async fn snapshot(&self) -> Vec<AccountSnapshot> {
        let mut snapshots = Vec::with_capacity(self.accounts.len());
        for account in &self.accounts {
            snapshots.push(account.snapshot().await);
        }
        snapshots
    }

    pub async fn total_balance(&self) -> i64 {
        let mut total = 0;
        for account in &self.accounts {
            total += account.balance().await;
        }
        total
    }

    fn position(&self, account: &Account) -> Option<usize> {
        self.accounts
            .iter()
            .position(|candidate| std::ptr::eq(candidate, account))
    }
}
