//! Handlers for the monthly counter endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/raids/stats` | Optional `?month=YYYY-MM` |
//! | `GET`  | `/raids/stats/{member_id}` | Zeroed stats for unknown members |
//! | `GET`  | `/raids/months` | Months with stored counters |
//! | `POST` | `/raids/record` | Moderator; body [`RaidEdge`] |
//! | `POST` | `/raids/remove` | Moderator; body [`RaidEdge`] |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tenf_core::{
  MonthKey,
  raid::{MonthlyRaids, RaidStats},
  store::BlobStore,
};

use crate::{AppState, MonthParams, auth::Moderator, error::ApiError, month_or_current, or_empty};

// ─── Reads ────────────────────────────────────────────────────────────────────

/// `GET /raids/stats[?month=YYYY-MM]`
pub async fn all<S: BlobStore>(
  State(state): State<AppState<S>>,
  Query(params): Query<MonthParams>,
) -> Result<Json<MonthlyRaids>, ApiError> {
  let month = params.month()?;
  Ok(Json(or_empty(state.ledger.all_stats_in(month).await, "raid stats")))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberStats {
  pub member_id: String,
  pub month:     MonthKey,
  pub stats:     RaidStats,
  /// Advisory flag for reviewers; see [`RaidStats::has_excessive_raids`].
  pub excessive: bool,
}

/// `GET /raids/stats/{member_id}[?month=YYYY-MM]`
pub async fn member<S: BlobStore>(
  State(state): State<AppState<S>>,
  Path(member_id): Path<String>,
  Query(params): Query<MonthParams>,
) -> Result<Json<MemberStats>, ApiError> {
  let month = params.month()?;
  let stats = or_empty(
    state.ledger.member_stats_in(month, &member_id).await,
    "member raid stats",
  );
  Ok(Json(MemberStats {
    excessive: stats.has_excessive_raids(),
    member_id,
    month,
    stats,
  }))
}

/// `GET /raids/months`
pub async fn months<S: BlobStore>(State(state): State<AppState<S>>) -> Json<Vec<MonthKey>> {
  Json(or_empty(state.ledger.months().await, "raid months"))
}

// ─── Writes ───────────────────────────────────────────────────────────────────

/// A raid between two members, optionally in a month other than the current
/// one.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaidEdge {
  pub raider_id: String,
  pub target_id: String,
  /// `YYYY-MM`; the current month when absent.
  #[serde(default)]
  pub month:     Option<String>,
}

impl RaidEdge {
  /// Check the ids and resolve the month the raid belongs to.
  fn validate(&self) -> Result<MonthKey, ApiError> {
    if self.raider_id.trim().is_empty() || self.target_id.trim().is_empty() {
      return Err(ApiError::BadRequest("raiderId and targetId are required".into()));
    }
    month_or_current(self.month.as_deref())
  }
}

/// `POST /raids/record` — count a raid directly, bypassing the pending queue.
pub async fn record<S: BlobStore>(
  _: Moderator,
  State(state): State<AppState<S>>,
  Json(body): Json<RaidEdge>,
) -> Result<StatusCode, ApiError> {
  let month = body.validate()?;
  state.ledger.record_raid_in(month, &body.raider_id, &body.target_id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /raids/remove` — undo one counted raid. 404 if none was counted.
pub async fn remove<S: BlobStore>(
  _: Moderator,
  State(state): State<AppState<S>>,
  Json(body): Json<RaidEdge>,
) -> Result<StatusCode, ApiError> {
  let month = body.validate()?;
  if !state.ledger.remove_raid_in(month, &body.raider_id, &body.target_id).await? {
    return Err(ApiError::NotFound(format!(
      "no counted raid {} -> {} in {month}",
      body.raider_id, body.target_id
    )));
  }
  Ok(StatusCode::NO_CONTENT)
}
