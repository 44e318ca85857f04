//! [`SqliteStore`] — the SQLite implementation of [`BlobStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use serde_json::Value;
use tenf_core::store::BlobStore;

use crate::{Error, Result, schema::SCHEMA};

/// A blob store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

impl BlobStore for SqliteStore {
  type Error = Error;

  async fn get(&self, key: &str) -> Result<Option<Value>> {
    let key_str = key.to_owned();

    let raw: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT value FROM blobs WHERE key = ?1",
              rusqlite::params![key_str],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .map(|s| serde_json::from_str(&s))
      .transpose()
      .map_err(|source| Error::Json { key: key.to_owned(), source })
  }

  async fn put(&self, key: &str, value: Value) -> Result<()> {
    let key_str   = key.to_owned();
    let value_str = value.to_string();
    let at_str    = Utc::now().to_rfc3339();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO blobs (key, value, updated_at) VALUES (?1, ?2, ?3)
           ON CONFLICT (key) DO UPDATE
             SET value = excluded.value, updated_at = excluded.updated_at",
          rusqlite::params![key_str, value_str, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
    let prefix_str = prefix.to_owned();

    let keys = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT key FROM blobs
           WHERE substr(key, 1, length(?1)) = ?1
           ORDER BY key",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![prefix_str], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(keys)
  }
}
