//! Moderator authentication for the mutating routes.
//!
//! Moderators send HTTP Basic credentials. There is one configured account;
//! its password is stored only as an argon2 PHC string.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use tenf_core::store::BlobStore;

use crate::{AppState, error::ApiError};

/// The moderator account this server accepts.
#[derive(Clone)]
pub struct AuthConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

impl AuthConfig {
  /// Whether `username`/`password` match the configured account.
  pub fn check(&self, username: &str, password: &str) -> bool {
    if username != self.username {
      return false;
    }
    let Ok(hash) = PasswordHash::new(&self.password_hash) else {
      tracing::error!("configured moderator password hash is not a PHC string");
      return false;
    };
    Argon2::default()
      .verify_password(password.as_bytes(), &hash)
      .is_ok()
  }

  /// Resolve the moderator behind a request's `Authorization` header.
  pub fn authenticate(&self, headers: &HeaderMap) -> Result<Moderator, ApiError> {
    match basic_credentials(headers) {
      Some((username, password)) if self.check(&username, &password) => {
        Ok(Moderator { username })
      }
      _ => Err(ApiError::Unauthorized),
    }
  }
}

/// The `user:password` pair carried by a Basic `Authorization` header.
/// `None` when the header is absent or malformed.
fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
  let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
  let (scheme, encoded) = value.split_once(' ')?;
  if !scheme.eq_ignore_ascii_case("basic") {
    return None;
  }
  let decoded = String::from_utf8(B64.decode(encoded.trim()).ok()?).ok()?;
  let (username, password) = decoded.split_once(':')?;
  Some((username.to_owned(), password.to_owned()))
}

/// An authenticated moderator. Taking this as a handler argument guards the
/// route.
#[derive(Debug)]
pub struct Moderator {
  pub username: String,
}

impl<S> FromRequestParts<AppState<S>> for Moderator
where
  S: BlobStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let moderator = state.auth.authenticate(&parts.headers).inspect_err(|_| {
      tracing::debug!(uri = %parts.uri, "rejected moderator credentials");
    })?;
    tracing::debug!(moderator = %moderator.username, uri = %parts.uri, "moderator request");
    Ok(moderator)
  }
}
