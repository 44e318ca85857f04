//! [`FileStore`] — a directory of JSON files implementing [`BlobStore`].

use std::{
  io::ErrorKind,
  path::{Path, PathBuf},
  sync::Arc,
};

use serde_json::Value;
use tenf_core::store::BlobStore;
use uuid::Uuid;

use crate::{Error, Result};

const EXTENSION: &str = "json";

/// Blobs stored as `<dir>/<key>.json`.
///
/// Writes go to a temporary file in the same directory and are renamed into
/// place, so a reader never sees a half-written document.
#[derive(Debug, Clone)]
pub struct FileStore {
  dir: Arc<PathBuf>,
}

impl FileStore {
  /// Use `dir` as the store, creating it if needed.
  pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
    let dir = dir.as_ref().to_path_buf();
    tokio::fs::create_dir_all(&dir)
      .await
      .map_err(|source| Error::Io { path: dir.clone(), source })?;
    Ok(Self { dir: Arc::new(dir) })
  }

  pub fn dir(&self) -> &Path { &self.dir }

  fn path_for(&self, key: &str) -> Result<PathBuf> {
    let valid = !key.is_empty()
      && key
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if !valid {
      return Err(Error::InvalidKey(key.to_owned()));
    }
    Ok(self.dir.join(format!("{key}.{EXTENSION}")))
  }
}

impl BlobStore for FileStore {
  type Error = Error;

  async fn get(&self, key: &str) -> Result<Option<Value>> {
    let path = self.path_for(key)?;
    let bytes = match tokio::fs::read(&path).await {
      Ok(bytes) => bytes,
      Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
      Err(source) => return Err(Error::Io { path, source }),
    };
    serde_json::from_slice(&bytes)
      .map(Some)
      .map_err(|source| Error::Json { path, source })
  }

  async fn put(&self, key: &str, value: Value) -> Result<()> {
    let path = self.path_for(key)?;
    let bytes = serde_json::to_vec_pretty(&value)
      .map_err(|source| Error::Json { path: path.clone(), source })?;

    let tmp = self.dir.join(format!(".{key}.{}.tmp", Uuid::new_v4().simple()));
    tokio::fs::write(&tmp, &bytes)
      .await
      .map_err(|source| Error::Io { path: tmp.clone(), source })?;

    if let Err(source) = tokio::fs::rename(&tmp, &path).await {
      let _ = tokio::fs::remove_file(&tmp).await;
      return Err(Error::Io { path, source });
    }
    tracing::trace!(?path, bytes = bytes.len(), "blob written");
    Ok(())
  }

  async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
    let io_err = |source| Error::Io { path: self.dir.to_path_buf(), source };

    let mut entries = tokio::fs::read_dir(self.dir.as_path()).await.map_err(io_err)?;
    let mut keys = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
      let path = entry.path();
      if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
        continue;
      }
      let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        continue;
      };
      if stem.starts_with(prefix) && !stem.starts_with('.') {
        keys.push(stem.to_owned());
      }
    }
    keys.sort();
    Ok(keys)
  }
}
