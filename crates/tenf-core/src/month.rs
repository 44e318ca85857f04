//! Month keys — the storage partition for raid counters.
//!
//! Counters for a calendar month live under `raids-YYYY-MM`; the unmatched
//! message log for the same month under `raids-unmatched-YYYY-MM`.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Prefix shared by every raid blob key.
pub const KEY_PREFIX: &str = "raids-";

const UNMATCHED_PREFIX: &str = "raids-unmatched-";

/// A calendar month. Displays and serialises as `YYYY-MM`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
  year:  i32,
  month: u32,
}

impl MonthKey {
  pub fn new(year: i32, month: u32) -> Result<Self> {
    if !(1..=12).contains(&month) || !(0..=9999).contains(&year) {
      return Err(Error::InvalidMonth(format!("{year}-{month}")));
    }
    Ok(Self { year, month })
  }

  /// The month containing `at`.
  pub fn of(at: DateTime<Utc>) -> Self {
    Self {
      year:  at.year(),
      month: at.month(),
    }
  }

  /// The current UTC month.
  pub fn current() -> Self { Self::of(Utc::now()) }

  pub fn year(&self) -> i32 { self.year }

  pub fn month(&self) -> u32 { self.month }

  /// Blob key holding this month's counters, e.g. `raids-2024-03`.
  pub fn counters_key(&self) -> String { format!("{KEY_PREFIX}{self}") }

  /// Blob key holding this month's unmatched message log.
  pub fn unmatched_key(&self) -> String { format!("{UNMATCHED_PREFIX}{self}") }

  /// Recover the month from a counters key. Returns `None` for any other
  /// `raids-*` key (the pending queue, unmatched logs).
  pub fn from_counters_key(key: &str) -> Option<Self> {
    key.strip_prefix(KEY_PREFIX)?.parse().ok()
  }
}

impl fmt::Display for MonthKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:04}-{:02}", self.year, self.month)
  }
}

impl FromStr for MonthKey {
  type Err = Error;

  /// Accepts `YYYY-MM` or the full counters key `raids-YYYY-MM`.
  fn from_str(s: &str) -> Result<Self> {
    let bare = s.strip_prefix(KEY_PREFIX).unwrap_or(s);
    let invalid = || Error::InvalidMonth(s.to_owned());

    let (year, month) = bare.split_once('-').ok_or_else(invalid)?;
    if year.len() != 4 || month.len() != 2 {
      return Err(invalid());
    }
    if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
      return Err(invalid());
    }

    let year = year.parse().map_err(|_| invalid())?;
    let month = month.parse().map_err(|_| invalid())?;
    Self::new(year, month).map_err(|_| invalid())
  }
}

impl TryFrom<String> for MonthKey {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { s.parse() }
}

impl From<MonthKey> for String {
  fn from(m: MonthKey) -> Self { m.to_string() }
}
