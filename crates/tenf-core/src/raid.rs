//! Raid counters — the per-month tally of who raided whom.
//!
//! A raid is a directed edge `raider → target`. The raider's record counts it
//! in `done` and `targets[target]`; the target's record counts it in
//! `received`. Both sides are updated together at write time and never
//! recomputed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Raids against one target above this count in a month are flagged for
/// review. Advisory only; nothing refuses a raid because of it.
pub const MAX_RAIDS_PER_TARGET: u32 = 2;

// ─── RaidStats ───────────────────────────────────────────────────────────────

/// One member's raid activity for a month.
///
/// Invariant: `done` equals the sum of `targets`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaidStats {
  /// Raids this member sent.
  #[serde(default)]
  pub done:     u32,
  /// Raids this member received.
  #[serde(default)]
  pub received: u32,
  /// Raids sent, broken down by target member id.
  #[serde(default)]
  pub targets:  BTreeMap<String, u32>,
}

impl RaidStats {
  /// True when any single target was raided more than
  /// [`MAX_RAIDS_PER_TARGET`] times.
  pub fn has_excessive_raids(&self) -> bool {
    self.targets.values().any(|&n| n > MAX_RAIDS_PER_TARGET)
  }
}

// ─── MonthlyRaids ────────────────────────────────────────────────────────────

/// Every member's [`RaidStats`] for one month, keyed by member id. This is the
/// value stored under a month's counters key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthlyRaids(BTreeMap<String, RaidStats>);

impl MonthlyRaids {
  /// Count one raid from `raider` to `target`, creating either record if
  /// absent.
  pub fn record(&mut self, raider_id: &str, target_id: &str) {
    let raider = self.0.entry(raider_id.to_owned()).or_default();
    raider.done = raider.done.saturating_add(1);
    let edge = raider.targets.entry(target_id.to_owned()).or_insert(0);
    *edge = edge.saturating_add(1);

    let target = self.0.entry(target_id.to_owned()).or_default();
    target.received = target.received.saturating_add(1);
  }

  /// Undo one counted raid from `raider` to `target`.
  ///
  /// Only acts when the `raider → target` edge is present, so a stray
  /// compensation can neither go below zero nor pull `done` out of step with
  /// `targets`. Returns whether anything changed.
  pub fn remove(&mut self, raider_id: &str, target_id: &str) -> bool {
    let Some(raider) = self.0.get_mut(raider_id) else {
      return false;
    };
    let Some(edge) = raider.targets.get_mut(target_id) else {
      return false;
    };

    *edge = edge.saturating_sub(1);
    if *edge == 0 {
      raider.targets.remove(target_id);
    }
    raider.done = raider.done.saturating_sub(1);

    if let Some(target) = self.0.get_mut(target_id) {
      target.received = target.received.saturating_sub(1);
    }
    true
  }

  /// A member's stats, or a zeroed record when they have no history.
  pub fn stats(&self, member_id: &str) -> RaidStats {
    self.0.get(member_id).cloned().unwrap_or_default()
  }

  pub fn get(&self, member_id: &str) -> Option<&RaidStats> { self.0.get(member_id) }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &RaidStats)> {
    self.0.iter().map(|(k, v)| (k.as_str(), v))
  }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }
}
