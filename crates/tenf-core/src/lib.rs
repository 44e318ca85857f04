//! Core types and the raid ledger for the TENF community dashboard.
//!
//! This crate is deliberately free of HTTP and database dependencies. Storage
//! backends implement [`store::BlobStore`]; the dashboard API and the chat-bot
//! integration both drive a [`ledger::RaidLedger`] built over one of them.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod ledger;
pub mod memory;
pub mod month;
pub mod pending;
pub mod raid;
pub mod store;
pub mod unmatched;

pub use error::{Error, Result};
pub use ledger::RaidLedger;
pub use month::MonthKey;
