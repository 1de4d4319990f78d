//! Application layer containing the transfer logic and its orchestration.
//!
//! `TransferEngine` performs single, lock-ordered transfers between two
//! accounts. `TransferCoordinator` runs a pool of `tokio` workers against it
//! until an exact number of transfers has committed.

pub mod coordinator;
pub mod engine;
