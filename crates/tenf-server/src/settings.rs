//! Runtime configuration, read from a TOML file and `TENF_*` environment
//! variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  /// Directory for the local JSON copy of every blob. Always written.
  pub mirror_dir:         PathBuf,
  /// SQLite file used as the primary blob store. When unset the mirror
  /// directory is the only store.
  #[serde(default)]
  pub blob_store_path:    Option<PathBuf>,
  pub auth_username:      String,
  /// argon2 PHC string; generate with `tenf-server --hash-password`.
  pub auth_password_hash: String,
}

impl ServerConfig {
  /// Load from `path` (optional) layered under `TENF_*` environment variables.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .set_default("host", "127.0.0.1")?
      .set_default("port", 8080)?
      .set_default("mirror_dir", "data/raids")?
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("TENF"))
      .build()
      .context("failed to read config file")?;

    let mut cfg: Self = settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")?;

    cfg.mirror_dir = expand_tilde(&cfg.mirror_dir);
    cfg.blob_store_path = cfg.blob_store_path.as_deref().map(expand_tilde);
    Ok(cfg)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
