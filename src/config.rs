use crate::error::{Result, SimulationError};
use std::ops::RangeInclusive;
use std::time::Duration;

/// Parameters of one simulation run.
///
/// Defaults mirror a slow, human-watchable run: one to two seconds of pacing
/// before every attempt and a one second bound on each lock wait.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Number of accounts in the registry. Must be at least 2.
    pub accounts_count: usize,
    /// Number of successful transfers after which the pool stops.
    pub target_transfers: usize,
    /// Number of parallel workers.
    pub worker_count: usize,
    /// Balance every account starts with.
    pub initial_balance: i64,
    /// Upper bound on each individual lock acquisition.
    pub lock_timeout: Duration,
    /// Shortest pacing delay before an attempt.
    pub min_delay: Duration,
    /// Longest pacing delay before an attempt.
    pub max_delay: Duration,
    /// Transfer amounts are drawn from `1..max_amount`.
    pub max_amount: i64,
    /// How long workers get to exit on their own once the target is reached.
    pub grace_period: Duration,
    /// Seeds the per-worker random generators when set.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            accounts_count: 4,
            target_transfers: 30,
            worker_count: 2,
            initial_balance: 10_000,
            lock_timeout: Duration::from_secs(1),
            min_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(2000),
            max_amount: 10_000,
            grace_period: Duration::from_secs(5),
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Default timings with the three sizing parameters replaced.
    pub fn new(accounts_count: usize, target_transfers: usize, worker_count: usize) -> Self {
        Self {
            accounts_count,
            target_transfers,
            worker_count,
            ..Self::default()
        }
    }

    /// Checks every documented minimum.
    pub fn validate(&self) -> Result<()> {
        if self.accounts_count < 2 {
            return Err(invalid("at least 2 accounts are required"));
        }
        if self.target_transfers == 0 {
            return Err(invalid("target transfer count must be positive"));
        }
        if self.worker_count == 0 {
            return Err(invalid("worker count must be positive"));
        }
        // A zero balance everywhere would make every transfer fail forever.
        if self.initial_balance < 1 {
            return Err(invalid("initial balance must be positive"));
        }
        if self.lock_timeout.is_zero() {
            return Err(invalid("lock timeout must be positive"));
        }
        if self.min_delay > self.max_delay {
            return Err(invalid("minimum delay must not exceed maximum delay"));
        }
        if self.max_amount < 2 {
            return Err(invalid("maximum amount must be at least 2"));
        }
        Ok(())
    }

    pub(crate) fn delay_range_ms(&self) -> RangeInclusive<u64> {
        millis(self.min_delay)..=millis(self.max_delay)
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn invalid(reason: &str) -> SimulationError {
    SimulationError::InvalidConfiguration(reason.to_string())
}
