//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized")]
  Unauthorized,

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<tenf_core::Error> for ApiError {
  fn from(e: tenf_core::Error) -> Self {
    match e {
      tenf_core::Error::InvalidMonth(m) => Self::BadRequest(format!("invalid month: {m:?}")),
      other => Self::Store(Box::new(other)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store write failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };

    let mut res = (status, Json(json!({ "error": message }))).into_response();
    if matches!(self, ApiError::Unauthorized) {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"tenf\""),
      );
    }
    res
  }
}
