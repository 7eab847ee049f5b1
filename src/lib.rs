//! Cadence library surface.
//!
//! Drives many independent wallets through randomized, time-dispersed
//! sequences of on-chain actions, with durable per-account progress so a
//! restart resumes exactly where the previous run stopped. Transaction
//! mechanics live behind the `executor` and `balances` boundary traits.

pub mod account;
pub mod actions;
pub mod balances;
pub mod error;
pub mod executor;
pub mod planner;
pub mod runner;
pub mod storage;
pub mod timing;

pub mod config {
    pub mod chains;
    pub mod settings;
    pub mod tokens;
}
