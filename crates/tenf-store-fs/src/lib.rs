//! Local filesystem blob backend for the TENF raid ledger.
//!
//! One pretty-printed JSON file per key. Serves as the always-written backup
//! copy next to the primary store, and as the only store in development.

mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::FileStore;

#[cfg(test)]
mod tests;
