//! tenf-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the
//! configured blob backend, and serves the raid ledger API under `/api`.
//!
//! # Password hash generation
//!
//! To generate the argon2 PHC string for `auth_password_hash`:
//!
//! ```
//! cargo run -p tenf-server -- --hash-password
//! ```

mod settings;

use std::path::PathBuf;

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use axum::Router;
use clap::Parser;
use rand_core::OsRng;
use tenf_api::{AppState, AuthConfig};
use tenf_core::{RaidLedger, store::{BlobStore, Mirrored}};
use tenf_store_fs::FileStore;
use tenf_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "TENF raid ledger server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if cli.hash_password {
    let password = read_password()?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
      .to_string();
    println!("{hash}");
    return Ok(());
  }

  let cfg = ServerConfig::load(&cli.config)?;
  let auth = AuthConfig {
    username:      cfg.auth_username.clone(),
    password_hash: cfg.auth_password_hash.clone(),
  };

  let files = FileStore::open(&cfg.mirror_dir)
    .await
    .with_context(|| format!("failed to open mirror dir {:?}", cfg.mirror_dir))?;

  // The backend is fixed for the life of the process.
  match &cfg.blob_store_path {
    Some(path) => {
      let primary = SqliteStore::open(path)
        .await
        .with_context(|| format!("failed to open blob store at {path:?}"))?;
      tracing::info!(?path, mirror = ?cfg.mirror_dir, "using sqlite blob store with file mirror");
      serve(Mirrored::new(primary, files), auth, &cfg).await
    }
    None => {
      tracing::info!(dir = ?cfg.mirror_dir, "no blob store configured, using file store only");
      serve(files, auth, &cfg).await
    }
  }
}

async fn serve<S>(store: S, auth: AuthConfig, cfg: &ServerConfig) -> anyhow::Result<()>
where
  S: BlobStore + 'static,
{
  let state = AppState::new(RaidLedger::new(store), auth);
  let app = Router::new().nest("/api", tenf_api::router(state));

  let address = cfg.address();
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;
  Ok(())
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
