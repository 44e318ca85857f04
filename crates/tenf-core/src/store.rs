//! The `BlobStore` trait and the mirrored backend combinator.
//!
//! The trait is implemented by storage backends (`tenf-store-sqlite`,
//! `tenf-store-fs`, and [`crate::memory::MemoryStore`]). The ledger depends on
//! this abstraction; which backend is active is decided once at startup.

use std::{collections::BTreeSet, future::Future};

use serde_json::Value;

// ─── Trait ───────────────────────────────────────────────────────────────────

/// A key → JSON document store.
///
/// Writes replace the whole value under a key; there is no partial update and
/// no concurrency token. Concurrent writers to one key race and the last write
/// wins.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait BlobStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read the value under `key`. Returns `None` if nothing was ever written.
  fn get<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<Value>, Self::Error>> + Send + 'a;

  /// Replace the value under `key`.
  fn put<'a>(
    &'a self,
    key: &'a str,
    value: Value,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// All stored keys starting with `prefix`, sorted.
  fn keys<'a>(
    &'a self,
    prefix: &'a str,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + 'a;
}

// ─── Mirrored ────────────────────────────────────────────────────────────────

/// A primary backend with every write copied to a secondary.
///
/// Only the primary's errors ever reach the caller; the mirror is a
/// best-effort copy.
///
/// - `put` writes the primary, then always attempts the mirror. A mirror
///   failure is logged and dropped; a primary failure is returned once the
///   mirror has been attempted.
/// - `get` prefers the primary and falls back to the mirror on a miss or an
///   error. If the primary failed and the mirror has nothing, the primary's
///   error is returned rather than an empty result. A mirror failure after a
///   clean primary miss is logged and reads as `None`.
///
/// No transaction spans the two; after a crash between writes they may
/// disagree until the key is next written.
#[derive(Debug, Clone)]
pub struct Mirrored<P, M> {
  primary: P,
  mirror:  M,
}

impl<P, M> Mirrored<P, M> {
  pub fn new(primary: P, mirror: M) -> Self { Self { primary, mirror } }

  pub fn primary(&self) -> &P { &self.primary }

  pub fn mirror(&self) -> &M { &self.mirror }
}

impl<P: BlobStore, M: BlobStore> BlobStore for Mirrored<P, M> {
  type Error = P::Error;

  async fn get(&self, key: &str) -> Result<Option<Value>, Self::Error> {
    let primary_err = match self.primary.get(key).await {
      Ok(Some(value)) => return Ok(Some(value)),
      Ok(None) => None,
      Err(e) => {
        tracing::warn!(key, error = %e, "primary read failed, trying mirror");
        Some(e)
      }
    };

    match (self.mirror.get(key).await, primary_err) {
      (Ok(Some(value)), _) => Ok(Some(value)),
      (Ok(None), None) => Ok(None),
      (Ok(None), Some(e)) | (Err(_), Some(e)) => Err(e),
      // The primary answered; a broken mirror must not block the caller.
      (Err(e), None) => {
        tracing::warn!(key, error = %e, "mirror read failed on primary miss");
        Ok(None)
      }
    }
  }

  async fn put(&self, key: &str, value: Value) -> Result<(), Self::Error> {
    let primary = self.primary.put(key, value.clone()).await;
    if let Err(e) = self.mirror.put(key, value).await {
      tracing::warn!(key, error = %e, "mirror write failed");
    }
    primary
  }

  async fn keys(&self, prefix: &str) -> Result<Vec<String>, Self::Error> {
    let primary = self.primary.keys(prefix).await;
    let mirror = self.mirror.keys(prefix).await;

    let mut all = BTreeSet::new();
    match (primary, mirror) {
      (Err(e), Err(_)) => return Err(e),
      (Ok(p), Ok(m)) => all.extend(p.into_iter().chain(m)),
      (Ok(p), Err(e)) => {
        tracing::warn!(prefix, error = %e, "mirror key listing failed");
        all.extend(p);
      }
      (Err(e), Ok(m)) => {
        tracing::warn!(prefix, error = %e, "primary key listing failed");
        all.extend(m);
      }
    }
    Ok(all.into_iter().collect())
  }
}
