//! Handlers for the pending raid queue.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/raids/pending` | Oldest first |
//! | `POST` | `/raids/pending` | Moderator; 201 when queued, 200 when already queued |
//! | `POST` | `/raids/pending/{message_id}/validate` | Moderator; 404 if not queued |
//! | `POST` | `/raids/pending/{message_id}/reject` | Moderator; 404 if not queued |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use serde::Serialize;
use tenf_core::{
  pending::{NewPendingRaid, PendingRaid},
  store::BlobStore,
};

use crate::{AppState, auth::Moderator, error::ApiError, or_empty};

/// `GET /raids/pending`
pub async fn list<S: BlobStore>(State(state): State<AppState<S>>) -> Json<Vec<PendingRaid>> {
  Json(or_empty(state.ledger.pending_raids().await, "pending raids"))
}

#[derive(Debug, Serialize)]
pub struct Queued {
  pub added: bool,
}

/// `POST /raids/pending` — body: [`NewPendingRaid`]
pub async fn create<S: BlobStore>(
  _: Moderator,
  State(state): State<AppState<S>>,
  Json(body): Json<NewPendingRaid>,
) -> Result<(StatusCode, Json<Queued>), ApiError> {
  if body.message_id.is_empty() || body.raider_id.is_empty() || body.target_id.is_empty() {
    return Err(ApiError::BadRequest(
      "messageId, raiderId and targetId are required".into(),
    ));
  }

  let added = state.ledger.add_pending_raid(body).await?;
  let status = if added { StatusCode::CREATED } else { StatusCode::OK };
  Ok((status, Json(Queued { added })))
}

/// `POST /raids/pending/{message_id}/validate`
pub async fn validate<S: BlobStore>(
  _: Moderator,
  State(state): State<AppState<S>>,
  Path(message_id): Path<String>,
) -> Result<StatusCode, ApiError> {
  if !state.ledger.validate_pending_raid(&message_id).await? {
    return Err(not_queued(&message_id));
  }
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /raids/pending/{message_id}/reject`
pub async fn reject<S: BlobStore>(
  _: Moderator,
  State(state): State<AppState<S>>,
  Path(message_id): Path<String>,
) -> Result<StatusCode, ApiError> {
  if !state.ledger.reject_pending_raid(&message_id).await? {
    return Err(not_queued(&message_id));
  }
  Ok(StatusCode::NO_CONTENT)
}

fn not_queued(message_id: &str) -> ApiError {
  ApiError::NotFound(format!("no pending raid for message {message_id}"))
}
