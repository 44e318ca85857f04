//! Unmatched raid messages — announcements that could not be parsed into a
//! raider/target pair, kept per month for manual triage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a message could not be turned into a pending raid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchReason {
  /// The text did not look like a raid announcement.
  RegexFail,
  /// The raider could not be resolved to a member.
  UnknownRaider,
  /// The target could not be resolved to a member.
  UnknownTarget,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmatchedRaidMessage {
  pub id:         String,
  pub content:    String,
  pub timestamp:  DateTime<Utc>,
  pub reason:     UnmatchReason,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub message_id: Option<String>,
}

impl UnmatchedRaidMessage {
  /// True if `key` is this entry's `id` or its chat `message_id`.
  pub fn matches(&self, key: &str) -> bool {
    self.id == key || self.message_id.as_deref() == Some(key)
  }

  fn conflicts_with(&self, other: &Self) -> bool {
    self.matches(&other.id) || other.message_id.as_deref().is_some_and(|m| self.matches(m))
  }
}

/// One month's log, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnmatchedLog(Vec<UnmatchedRaidMessage>);

impl UnmatchedLog {
  /// Append `message` unless an entry with the same id or message id exists.
  pub fn push_unique(&mut self, message: UnmatchedRaidMessage) -> bool {
    if self.0.iter().any(|m| m.conflicts_with(&message)) {
      return false;
    }
    self.0.push(message);
    true
  }

  /// Drop every entry matching `key`; returns whether any were dropped.
  pub fn remove(&mut self, key: &str) -> bool {
    let before = self.0.len();
    self.0.retain(|m| !m.matches(key));
    self.0.len() != before
  }

  pub fn into_vec(self) -> Vec<UnmatchedRaidMessage> { self.0 }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }
}
