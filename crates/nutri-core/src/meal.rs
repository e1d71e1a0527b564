//! Daily meal aggregates and the foods linked to them.
//!
//! A [`DailyMeal`] exists at most once per (user, date) pair and carries a
//! running calorie total. The total is derived: it must always equal the sum
//! of `calories` over the foods linked to the aggregate through meal entries.

use std::fmt;

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, food::Food};

// ─── Track id ────────────────────────────────────────────────────────────────

/// Identifier of a [`DailyMeal`]: the prefix `TR` followed by a sequence
/// number zero-padded to at least three digits (`TR001`, `TR042`, `TR1000`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TrackId(String);

impl TrackId {
  pub const PREFIX: &'static str = "TR";

  /// The id handed out when no daily meal exists yet.
  pub fn first() -> Self { Self::from_seq(1) }

  pub fn from_seq(seq: u64) -> Self { Self(format!("{}{seq:03}", Self::PREFIX)) }

  /// Parse a track id string, validating prefix and numeric suffix.
  pub fn parse(s: &str) -> Result<Self> {
    Self::seq_of(s)?;
    Ok(Self(s.to_owned()))
  }

  /// The numeric suffix of `s`.
  pub fn seq_of(s: &str) -> Result<u64> {
    let digits = s
      .strip_prefix(Self::PREFIX)
      .filter(|d| !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit()))
      .ok_or_else(|| Error::InvalidTrackId(s.to_owned()))?;
    digits
      .parse()
      .map_err(|_| Error::InvalidTrackId(s.to_owned()))
  }

  pub fn seq(&self) -> u64 {
    // Constructors only admit well-formed ids.
    Self::seq_of(&self.0).unwrap_or(0)
  }

  /// The id following `current_max`, or [`TrackId::first`] when there is none.
  pub fn next_after(current_max: Option<u64>) -> Self {
    match current_max {
      Some(seq) => Self::from_seq(seq + 1),
      None      => Self::first(),
    }
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

/// Ordered by sequence number, so `TR999 < TR1000`.
impl Ord for TrackId {
  fn cmp(&self, other: &Self) -> std::cmp::Ordering {
    self.seq().cmp(&other.seq()).then_with(|| self.0.cmp(&other.0))
  }
}

impl PartialOrd for TrackId {
  fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> { Some(self.cmp(other)) }
}

impl fmt::Display for TrackId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl TryFrom<String> for TrackId {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> {
    Self::seq_of(&s)?;
    Ok(Self(s))
  }
}

impl From<TrackId> for String {
  fn from(id: TrackId) -> Self { id.0 }
}

// ─── Dates ───────────────────────────────────────────────────────────────────

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
    .map_err(|_| Error::InvalidDate(s.to_owned()))
}

/// First and last day of the calendar month containing `day`.
pub fn month_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate) {
  let first = day.with_day(1).unwrap_or(day);
  let last = first
    .checked_add_months(Months::new(1))
    .and_then(|next| next.pred_opt())
    .unwrap_or(first);
  (first, last)
}

/// Parse a `YYYY-MM` month into its first and last day.
pub fn parse_month(s: &str) -> Result<(NaiveDate, NaiveDate)> {
  let first = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), DATE_FORMAT)
    .map_err(|_| Error::InvalidMonth(s.to_owned()))?;
  Ok(month_bounds(first))
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// The per-user, per-date calorie aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMeal {
  pub track_id:       TrackId,
  pub user_id:        String,
  pub meal_date:      NaiveDate,
  pub total_calories: i64,
}

/// One food logged against a daily meal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealEntry {
  pub link_id:   i64,
  pub logged_at: DateTime<Utc>,
  pub food:      Food,
}

/// A daily meal together with everything logged against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMeals {
  #[serde(flatten)]
  pub daily: DailyMeal,
  pub meals: Vec<MealEntry>,
}

impl DailyMeals {
  /// Sum of calories over all linked foods.
  pub fn linked_calories(&self) -> i64 {
    self.meals.iter().map(|m| m.food.calories).sum()
  }
}

/// Validate the user id half of a (user, date) key.
pub fn validate_user_id(user_id: &str) -> Result<()> {
  if user_id.trim().is_empty() {
    return Err(Error::invalid("user_id", "must not be empty"));
  }
  Ok(())
}
