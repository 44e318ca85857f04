//! Pending raids — claims awaiting a moderator's reaction.
//!
//! A single queue exists for the whole process, stored under
//! [`PENDING_KEY`]. Entries stay queued until validated or rejected; there is
//! no expiry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Blob key of the pending queue.
pub const PENDING_KEY: &str = "raids-pending";

/// A raid announcement detected in chat, not yet confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRaid {
  /// Chat message the raid was announced in; unique within the queue.
  pub message_id:          String,
  pub raider_id:           String,
  pub target_id:           String,
  /// Name as written in the announcement, for display only.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub raider_display_hint: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub target_display_hint: Option<String>,
  /// Server-assigned when the claim is queued.
  pub timestamp:           DateTime<Utc>,
}

/// Input to [`crate::RaidLedger::add_pending_raid`]. The timestamp is always
/// set by the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPendingRaid {
  pub message_id:          String,
  pub raider_id:           String,
  pub target_id:           String,
  #[serde(default)]
  pub raider_display_hint: Option<String>,
  #[serde(default)]
  pub target_display_hint: Option<String>,
}

impl NewPendingRaid {
  pub fn new(
    message_id: impl Into<String>,
    raider_id: impl Into<String>,
    target_id: impl Into<String>,
  ) -> Self {
    Self {
      message_id:          message_id.into(),
      raider_id:           raider_id.into(),
      target_id:           target_id.into(),
      raider_display_hint: None,
      target_display_hint: None,
    }
  }

  pub(crate) fn queued_at(self, timestamp: DateTime<Utc>) -> PendingRaid {
    PendingRaid {
      message_id: self.message_id,
      raider_id: self.raider_id,
      target_id: self.target_id,
      raider_display_hint: self.raider_display_hint,
      target_display_hint: self.target_display_hint,
      timestamp,
    }
  }
}

/// The stored queue, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PendingQueue(Vec<PendingRaid>);

impl PendingQueue {
  pub fn contains(&self, message_id: &str) -> bool {
    self.0.iter().any(|p| p.message_id == message_id)
  }

  /// Append `raid` unless its message is already queued.
  pub fn push_unique(&mut self, raid: PendingRaid) -> bool {
    if self.contains(&raid.message_id) {
      return false;
    }
    self.0.push(raid);
    true
  }

  /// Remove and return the entry for `message_id`.
  pub fn take(&mut self, message_id: &str) -> Option<PendingRaid> {
    let idx = self.0.iter().position(|p| p.message_id == message_id)?;
    Some(self.0.remove(idx))
  }

  pub fn into_vec(self) -> Vec<PendingRaid> { self.0 }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }
}
