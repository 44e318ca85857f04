//! JSON REST API for the TENF raid ledger.
//!
//! Exposes an axum [`Router`] backed by a [`RaidLedger`] over any
//! [`BlobStore`]. Reads are public; every mutating route requires moderator
//! credentials (HTTP Basic). TLS and transport are the caller's concern.
//!
//! Read routes serve an empty result when storage is unavailable, logging the
//! failure; write routes answer 500.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", tenf_api::router(state))
//! ```

pub mod auth;
pub mod error;
pub mod pending;
pub mod stats;
pub mod unmatched;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post},
};
use serde::Deserialize;
use tenf_core::{MonthKey, RaidLedger, store::BlobStore};
use tower_http::trace::TraceLayer;

pub use auth::AuthConfig;
pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub ledger: Arc<RaidLedger<S>>,
  pub auth:   Arc<AuthConfig>,
}

impl<S> AppState<S> {
  pub fn new(ledger: RaidLedger<S>, auth: AuthConfig) -> Self {
    Self { ledger: Arc::new(ledger), auth: Arc::new(auth) }
  }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { ledger: Arc::clone(&self.ledger), auth: Arc::clone(&self.auth) }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: BlobStore + 'static,
{
  Router::new()
    // Counters
    .route("/raids/stats", get(stats::all::<S>))
    .route("/raids/stats/{member_id}", get(stats::member::<S>))
    .route("/raids/months", get(stats::months::<S>))
    .route("/raids/record", post(stats::record::<S>))
    .route("/raids/remove", post(stats::remove::<S>))
    // Pending queue
    .route("/raids/pending", get(pending::list::<S>).post(pending::create::<S>))
    .route("/raids/pending/{message_id}/validate", post(pending::validate::<S>))
    .route("/raids/pending/{message_id}/reject", post(pending::reject::<S>))
    // Unmatched log
    .route("/raids/unmatched", get(unmatched::list::<S>).post(unmatched::create::<S>))
    .route("/raids/unmatched/{id}", delete(unmatched::remove::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Shared helpers ───────────────────────────────────────────────────────────

/// `?month=YYYY-MM`; defaults to the current month.
#[derive(Debug, Deserialize)]
pub struct MonthParams {
  pub month: Option<String>,
}

impl MonthParams {
  pub fn month(&self) -> Result<MonthKey, ApiError> {
    month_or_current(self.month.as_deref())
  }
}

/// Parse a client-supplied month, kept as a string until here so a bad value
/// is reported as a JSON 400 rather than an extractor rejection.
fn month_or_current(raw: Option<&str>) -> Result<MonthKey, ApiError> {
  match raw {
    None => Ok(MonthKey::current()),
    Some(raw) => Ok(raw.parse::<MonthKey>()?),
  }
}

/// Collapse a failed read into an empty value so dashboards keep rendering.
fn or_empty<T: Default>(result: tenf_core::Result<T>, what: &'static str) -> T {
  result.unwrap_or_else(|e| {
    tracing::warn!(error = %e, what, "read failed, serving empty result");
    T::default()
  })
}

#[cfg(test)]
mod tests;
