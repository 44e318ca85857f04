//! [`MemoryStore`] — a process-local [`BlobStore`].
//!
//! Nothing survives a restart. Used in tests and as the store behind
//! ephemeral deployments.

use std::{collections::BTreeMap, convert::Infallible, sync::Arc};

use serde_json::Value;
use tokio::sync::RwLock;

use crate::store::BlobStore;

/// Cloning is cheap; clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  blobs: Arc<RwLock<BTreeMap<String, Value>>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }
}

impl BlobStore for MemoryStore {
  type Error = Infallible;

  async fn get(&self, key: &str) -> Result<Option<Value>, Infallible> {
    Ok(self.blobs.read().await.get(key).cloned())
  }

  async fn put(&self, key: &str, value: Value) -> Result<(), Infallible> {
    self.blobs.write().await.insert(key.to_owned(), value);
    Ok(())
  }

  async fn keys(&self, prefix: &str) -> Result<Vec<String>, Infallible> {
    Ok(
      self
        .blobs
        .read()
        .await
        .keys()
        .filter(|k| k.starts_with(prefix))
        .cloned()
        .collect(),
    )
  }
}
