#![allow(dead_code)]

use std::time::Duration;
use transfer_sim::config::SimulationConfig;
use transfer_sim::domain::account::Account;

/// Millisecond pacing so a run finishes in well under a second.
pub fn fast_config(accounts: usize, target: usize, workers: usize) -> SimulationConfig {
    SimulationConfig {
        lock_timeout: Duration::from_millis(200),
        min_delay: Duration::from_millis(0),
        max_delay: Duration::from_millis(3),
        grace_period: Duration::from_secs(2),
        ..SimulationConfig::new(accounts, target, workers)
    }
}

pub async fn total(accounts: &[&Account]) -> i64 {
    let mut sum = 0;
    for account in accounts {
        sum += account.balance().await;
    }
    sum
}
