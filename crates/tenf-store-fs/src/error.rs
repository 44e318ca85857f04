//! Error type for `tenf-store-fs`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("io error on {path:?}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("json error in {path:?}: {source}")]
  Json {
    path:   PathBuf,
    #[source]
    source: serde_json::Error,
  },

  /// Keys become file names, so only `[A-Za-z0-9_-]` is allowed.
  #[error("invalid blob key: {0:?}")]
  InvalidKey(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
