//! PICKBOOK — Bankroll Accounting & Bet Settlement Engine
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod analytics;
pub mod config;
pub mod dashboard;
pub mod history;
pub mod ledger;
pub mod odds;
pub mod reconcile;
pub mod risk;
pub mod session;
pub mod source;
pub mod storage;
pub mod types;
