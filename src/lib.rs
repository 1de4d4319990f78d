pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;

use application::coordinator::{RunReport, TransferCoordinator};
use application::engine::TransferEngine;
use config::SimulationConfig;
use error::Result;
use infrastructure::in_memory::AccountRegistry;
use std::sync::Arc;

/// Creates `count` accounts, each holding `initial_balance`.
pub fn create_accounts(count: usize, initial_balance: i64) -> Result<AccountRegistry> {
    AccountRegistry::create(count, initial_balance)
}

/// Runs a simulation with default timings until `target_transfers` transfers
/// have committed.
pub async fn run(
    accounts_count: usize,
    target_transfers: usize,
    worker_count: usize,
) -> Result<RunReport> {
    run_with_config(SimulationConfig::new(
        accounts_count,
        target_transfers,
        worker_count,
    ))
    .await
}

/// Runs a simulation with the production engine and the given configuration.
pub async fn run_with_config(config: SimulationConfig) -> Result<RunReport> {
    let engine = Arc::new(TransferEngine::new(config.lock_timeout));
    TransferCoordinator::new(config, engine)?.run().await
}
