//! Handlers for the unmatched raid message log.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/raids/unmatched` | Optional `?month=YYYY-MM` |
//! | `POST`   | `/raids/unmatched` | Moderator; body [`NewUnmatchedBody`] |
//! | `DELETE` | `/raids/unmatched/{id}` | Moderator; `id` or message id; optional `?month` |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tenf_core::{
  store::BlobStore,
  unmatched::{UnmatchReason, UnmatchedRaidMessage},
};

use crate::{AppState, MonthParams, auth::Moderator, error::ApiError, or_empty, pending::Queued};

/// `GET /raids/unmatched[?month=YYYY-MM]`
pub async fn list<S: BlobStore>(
  State(state): State<AppState<S>>,
  Query(params): Query<MonthParams>,
) -> Result<Json<Vec<UnmatchedRaidMessage>>, ApiError> {
  let month = params.month()?;
  Ok(Json(or_empty(state.ledger.unmatched_raids(month).await, "unmatched raids")))
}

/// Body for `POST /raids/unmatched`. `timestamp` defaults to now and decides
/// which month's log the entry lands in.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUnmatchedBody {
  pub id:         String,
  pub content:    String,
  pub reason:     UnmatchReason,
  #[serde(default)]
  pub message_id: Option<String>,
  #[serde(default)]
  pub timestamp:  Option<DateTime<Utc>>,
}

/// `POST /raids/unmatched`
pub async fn create<S: BlobStore>(
  _: Moderator,
  State(state): State<AppState<S>>,
  Json(body): Json<NewUnmatchedBody>,
) -> Result<(StatusCode, Json<Queued>), ApiError> {
  if body.id.is_empty() {
    return Err(ApiError::BadRequest("id is required".into()));
  }

  let message = UnmatchedRaidMessage {
    id:         body.id,
    content:    body.content,
    timestamp:  body.timestamp.unwrap_or_else(Utc::now),
    reason:     body.reason,
    message_id: body.message_id,
  };
  let added = state.ledger.add_unmatched_raid(message).await?;
  let status = if added { StatusCode::CREATED } else { StatusCode::OK };
  Ok((status, Json(Queued { added })))
}

/// `DELETE /raids/unmatched/{id}[?month=YYYY-MM]`
pub async fn remove<S: BlobStore>(
  _: Moderator,
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  Query(params): Query<MonthParams>,
) -> Result<StatusCode, ApiError> {
  let month = params.month()?;
  if !state.ledger.remove_unmatched_raid(month, &id).await? {
    return Err(ApiError::NotFound(format!("no unmatched message {id} in {month}")));
  }
  Ok(StatusCode::NO_CONTENT)
}
