//! Error types for `tenf-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid month: {0:?}")]
  InvalidMonth(String),

  /// A stored blob exists but does not decode into the expected shape.
  #[error("stored blob {key:?} is corrupt: {source}")]
  Corrupt {
    key:    String,
    #[source]
    source: serde_json::Error,
  },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
