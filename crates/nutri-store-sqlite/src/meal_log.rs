//! The meal-log unit of work.
//!
//! Every function here runs synchronously on the connection thread, inside a
//! single `BEGIN IMMEDIATE` transaction. Taking the write lock up front
//! serializes concurrent loggers before the find-or-create lookup, so two
//! callers can never both miss the same (user, date) row or read the same
//! maximum track id. The `UNIQUE (user_id, meal_date)` index backs this up.
//!
//! A `Transaction` rolls back when dropped, so any `?` below leaves the
//! database exactly as it was before the call.

use rusqlite::{Connection, OptionalExtension as _, TransactionBehavior, params};
use nutri_core::meal::TrackId;

use crate::encode::RawDailyMeal;

/// What [`log_meal`] did.
#[derive(Debug)]
pub(crate) enum LogOutcome {
  Logged {
    track_id: String,
    created:  bool,
    total:    i64,
  },
  /// The food does not exist. Nothing was written.
  UnknownFood,
}

pub(crate) fn log_meal(
  conn:      &mut Connection,
  user_id:   &str,
  meal_date: &str,
  food_id:   &str,
  logged_at: &str,
) -> rusqlite::Result<LogOutcome> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  let existing: Option<String> = tx
    .query_row(
      "SELECT track_id FROM daily_meal WHERE user_id = ?1 AND meal_date = ?2",
      params![user_id, meal_date],
      |r| r.get(0),
    )
    .optional()?;

  let (track_id, created) = match existing {
    Some(id) => (id, false),
    None => {
      let id = next_track_id(&tx)?.to_string();
      tx.execute(
        "INSERT INTO daily_meal (track_id, user_id, meal_date, total_calories)
         VALUES (?1, ?2, ?3, 0)",
        params![id, user_id, meal_date],
      )?;
      tracing::debug!(%id, user_id, meal_date, "created daily meal");
      (id, true)
    }
  };

  if !food_exists(&tx, food_id)? {
    tx.rollback()?;
    return Ok(LogOutcome::UnknownFood);
  }

  tx.execute(
    "INSERT INTO meal_detail (track_id, food_id, logged_at) VALUES (?1, ?2, ?3)",
    params![track_id, food_id, logged_at],
  )?;

  let total = recompute_total(&tx, &track_id)?;
  tx.commit()?;

  Ok(LogOutcome::Logged { track_id, created, total })
}

/// Delete one meal entry of `user_id` and recompute its daily meal. Returns
/// the updated daily meal, or `None` if the user has no entry `link_id`.
pub(crate) fn remove_meal(
  conn:    &mut Connection,
  user_id: &str,
  link_id: i64,
) -> rusqlite::Result<Option<RawDailyMeal>> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  let track_id: Option<String> = tx
    .query_row(
      "SELECT md.track_id
       FROM meal_detail md
       JOIN daily_meal d ON d.track_id = md.track_id
       WHERE md.link_id = ?1 AND d.user_id = ?2",
      params![link_id, user_id],
      |r| r.get(0),
    )
    .optional()?;

  let Some(track_id) = track_id else {
    tx.rollback()?;
    return Ok(None);
  };

  tx.execute("DELETE FROM meal_detail WHERE link_id = ?1", params![link_id])?;
  recompute_total(&tx, &track_id)?;

  let daily = tx.query_row(
    &format!("SELECT {} FROM daily_meal WHERE track_id = ?1", RawDailyMeal::COLUMNS),
    params![track_id],
    RawDailyMeal::from_row,
  )?;
  tx.commit()?;

  Ok(Some(daily))
}

/// Recompute a daily meal's total from its linked foods in its own
/// transaction. Returns the new total, or `None` if `track_id` does not exist.
pub(crate) fn recompute_in_tx(
  conn: &mut Connection,
  track_id: &str,
) -> rusqlite::Result<Option<i64>> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let exists = tx
    .query_row(
      "SELECT 1 FROM daily_meal WHERE track_id = ?1",
      params![track_id],
      |_| Ok(()),
    )
    .optional()?
    .is_some();
  if !exists {
    return Ok(None);
  }

  let total = recompute_total(&tx, track_id)?;
  tx.commit()?;
  Ok(Some(total))
}

/// Rewrite `total_calories` of `track_id` as the sum over its linked foods.
///
/// Always a full aggregate, never an increment, so repeated calls converge on
/// the same value.
pub(crate) fn recompute_total(conn: &Connection, track_id: &str) -> rusqlite::Result<i64> {
  let total: i64 = conn.query_row(
    "SELECT COALESCE(SUM(f.calories), 0)
     FROM meal_detail md
     JOIN food f ON f.food_id = md.food_id
     WHERE md.track_id = ?1",
    params![track_id],
    |r| r.get(0),
  )?;

  conn.execute(
    "UPDATE daily_meal SET total_calories = ?1 WHERE track_id = ?2",
    params![total, track_id],
  )?;

  Ok(total)
}

/// The track id following the numerically largest one in `daily_meal`.
///
/// Only safe under the write lock held by the caller's transaction.
pub(crate) fn next_track_id(conn: &Connection) -> rusqlite::Result<TrackId> {
  let max: Option<i64> = conn.query_row(
    "SELECT MAX(CAST(SUBSTR(track_id, ?1) AS INTEGER))
     FROM daily_meal
     WHERE track_id LIKE ?2",
    params![
      TrackId::PREFIX.len() as i64 + 1,
      format!("{}%", TrackId::PREFIX),
    ],
    |r| r.get(0),
  )?;

  Ok(TrackId::next_after(max.and_then(|n| u64::try_from(n).ok())))
}

fn food_exists(conn: &Connection, food_id: &str) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM food WHERE food_id = ?1",
        params![food_id],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}
