//! Domain types: accounts, the one-shot signal, and the transfer port.

pub mod account;
pub mod ports;
pub mod signal;
