//! [`RaidLedger`] — every raid bookkeeping operation over an injected
//! [`BlobStore`].
//!
//! Each write is a full read-modify-write of one blob: a month's counters,
//! a month's unmatched log, or the pending queue. There is no locking, so two
//! writers touching the same blob at once can lose an update.
//!
//! Reads return `Result` like everything else. Callers that prefer to show
//! an empty history over an error collapse the failure themselves.

use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, info};

use crate::{
  Error, Result,
  month::{KEY_PREFIX, MonthKey},
  pending::{NewPendingRaid, PENDING_KEY, PendingQueue, PendingRaid},
  raid::{MonthlyRaids, RaidStats},
  store::BlobStore,
  unmatched::{UnmatchedLog, UnmatchedRaidMessage},
};

/// The raid bookkeeping service. Construct once per process around the
/// configured backend and share it (e.g. behind an `Arc`).
#[derive(Debug, Clone)]
pub struct RaidLedger<S> {
  store: S,
}

impl<S: BlobStore> RaidLedger<S> {
  pub fn new(store: S) -> Self { Self { store } }

  pub fn store(&self) -> &S { &self.store }

  async fn load<T>(&self, key: &str) -> Result<T>
  where
    T: DeserializeOwned + Default,
  {
    match self.store.get(key).await.map_err(Error::store)? {
      None => Ok(T::default()),
      Some(value) => serde_json::from_value(value).map_err(|source| Error::Corrupt {
        key: key.to_owned(),
        source,
      }),
    }
  }

  async fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
    let value = serde_json::to_value(value)?;
    self.store.put(key, value).await.map_err(Error::store)?;
    debug!(key, "saved");
    Ok(())
  }

  // ── Counters ──────────────────────────────────────────────────────────

  /// Count a raid in the current month. Calling this twice for the same raid
  /// counts it twice; de-duplication happens in the pending queue.
  pub async fn record_raid(&self, raider_id: &str, target_id: &str) -> Result<()> {
    self.record_raid_in(MonthKey::current(), raider_id, target_id).await
  }

  pub async fn record_raid_in(
    &self,
    month: MonthKey,
    raider_id: &str,
    target_id: &str,
  ) -> Result<()> {
    let key = month.counters_key();
    let mut raids: MonthlyRaids = self.load(&key).await?;
    raids.record(raider_id, target_id);
    self.save(&key, &raids).await?;
    debug!(%month, raider_id, target_id, "raid recorded");
    Ok(())
  }

  /// Undo one counted raid in the current month. A no-op (and no write) when
  /// no such raid was counted.
  pub async fn remove_raid(&self, raider_id: &str, target_id: &str) -> Result<bool> {
    self.remove_raid_in(MonthKey::current(), raider_id, target_id).await
  }

  pub async fn remove_raid_in(
    &self,
    month: MonthKey,
    raider_id: &str,
    target_id: &str,
  ) -> Result<bool> {
    let key = month.counters_key();
    let mut raids: MonthlyRaids = self.load(&key).await?;
    if !raids.remove(raider_id, target_id) {
      debug!(%month, raider_id, target_id, "no counted raid to remove");
      return Ok(false);
    }
    self.save(&key, &raids).await?;
    debug!(%month, raider_id, target_id, "raid removed");
    Ok(true)
  }

  /// A member's stats for the current month; zeroed if they have none.
  pub async fn member_stats(&self, member_id: &str) -> Result<RaidStats> {
    self.member_stats_in(MonthKey::current(), member_id).await
  }

  pub async fn member_stats_in(&self, month: MonthKey, member_id: &str) -> Result<RaidStats> {
    let raids: MonthlyRaids = self.load(&month.counters_key()).await?;
    Ok(raids.stats(member_id))
  }

  pub async fn all_stats(&self) -> Result<MonthlyRaids> {
    self.all_stats_in(MonthKey::current()).await
  }

  pub async fn all_stats_in(&self, month: MonthKey) -> Result<MonthlyRaids> {
    self.load(&month.counters_key()).await
  }

  /// Whether the member raided any one target more than
  /// [`crate::raid::MAX_RAIDS_PER_TARGET`] times this month.
  pub async fn has_excessive_raids(&self, member_id: &str) -> Result<bool> {
    self.has_excessive_raids_in(MonthKey::current(), member_id).await
  }

  pub async fn has_excessive_raids_in(&self, month: MonthKey, member_id: &str) -> Result<bool> {
    Ok(self.member_stats_in(month, member_id).await?.has_excessive_raids())
  }

  /// Months that have stored counters, oldest first.
  pub async fn months(&self) -> Result<Vec<MonthKey>> {
    let keys = self.store.keys(KEY_PREFIX).await.map_err(Error::store)?;
    let mut months: Vec<MonthKey> =
      keys.iter().filter_map(|k| MonthKey::from_counters_key(k)).collect();
    months.sort();
    months.dedup();
    Ok(months)
  }

  // ── Pending queue ─────────────────────────────────────────────────────

  /// Queue a raid claim. Returns `false` without writing if the message is
  /// already queued.
  pub async fn add_pending_raid(&self, input: NewPendingRaid) -> Result<bool> {
    let mut queue: PendingQueue = self.load(PENDING_KEY).await?;
    let message_id = input.message_id.clone();
    if !queue.push_unique(input.queued_at(Utc::now())) {
      debug!(%message_id, "raid already pending");
      return Ok(false);
    }
    self.save(PENDING_KEY, &queue).await?;
    info!(%message_id, pending = queue.len(), "raid queued for validation");
    Ok(true)
  }

  /// Every queued claim, oldest first.
  pub async fn pending_raids(&self) -> Result<Vec<PendingRaid>> {
    Ok(self.load::<PendingQueue>(PENDING_KEY).await?.into_vec())
  }

  /// Confirm a queued claim: dequeue it, then count it in the current month.
  /// Returns `false` if nothing is queued under `message_id`.
  ///
  /// The dequeue is written first, so a failed write leaves the claim queued
  /// and uncounted and a retry counts it once.
  pub async fn validate_pending_raid(&self, message_id: &str) -> Result<bool> {
    let mut queue: PendingQueue = self.load(PENDING_KEY).await?;
    let Some(raid) = queue.take(message_id) else {
      return Ok(false);
    };

    self.save(PENDING_KEY, &queue).await?;
    self.record_raid(&raid.raider_id, &raid.target_id).await?;
    info!(
      message_id,
      raider = %raid.raider_id,
      target = %raid.target_id,
      "raid validated"
    );
    Ok(true)
  }

  /// Discard a queued claim. Also undoes a matching counted raid, in case the
  /// claim had been validated before a correcting reaction arrived. Returns
  /// `false` if nothing is queued under `message_id`.
  pub async fn reject_pending_raid(&self, message_id: &str) -> Result<bool> {
    let mut queue: PendingQueue = self.load(PENDING_KEY).await?;
    let Some(raid) = queue.take(message_id) else {
      return Ok(false);
    };

    self.save(PENDING_KEY, &queue).await?;
    let uncounted = self.remove_raid(&raid.raider_id, &raid.target_id).await?;
    info!(
      message_id,
      raider = %raid.raider_id,
      target = %raid.target_id,
      uncounted,
      "raid rejected"
    );
    Ok(true)
  }

  // ── Unmatched log ─────────────────────────────────────────────────────

  /// Log a message for manual triage in the month of its timestamp. Returns
  /// `false` if an entry with the same id or message id is already logged.
  pub async fn add_unmatched_raid(&self, message: UnmatchedRaidMessage) -> Result<bool> {
    let key = MonthKey::of(message.timestamp).unmatched_key();
    let mut log: UnmatchedLog = self.load(&key).await?;
    let id = message.id.clone();
    if !log.push_unique(message) {
      debug!(%key, %id, "unmatched message already logged");
      return Ok(false);
    }
    self.save(&key, &log).await?;
    info!(%key, %id, "unmatched raid message logged");
    Ok(true)
  }

  pub async fn unmatched_raids(&self, month: MonthKey) -> Result<Vec<UnmatchedRaidMessage>> {
    Ok(self.load::<UnmatchedLog>(&month.unmatched_key()).await?.into_vec())
  }

  /// Drop entries whose id or message id is `id`. Returns whether any were
  /// dropped.
  pub async fn remove_unmatched_raid(&self, month: MonthKey, id: &str) -> Result<bool> {
    let key = month.unmatched_key();
    let mut log: UnmatchedLog = self.load(&key).await?;
    if !log.remove(id) {
      return Ok(false);
    }
    self.save(&key, &log).await?;
    debug!(%key, id, "unmatched raid message removed");
    Ok(true)
  }
}
