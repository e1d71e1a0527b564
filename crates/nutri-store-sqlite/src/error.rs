//! Error type for `nutri-store-sqlite`.

use nutri_core::{Classify, ErrorKind};
use rusqlite::{
  ErrorCode,
  ffi::{SQLITE_CONSTRAINT_PRIMARYKEY, SQLITE_CONSTRAINT_UNIQUE},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0}")]
  Core(#[from] nutri_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unexpected column value: {0}")]
  Decode(String),

  #[error("unknown food_id: {0}")]
  UnknownFood(String),

  #[error("meal entry not found: {0}")]
  MealEntryNotFound(i64),

  #[error("daily meal not found: {0}")]
  DailyMealNotFound(String),

  #[error("conflict: {0}")]
  Conflict(String),

  /// A stored daily total disagrees with the sum of its linked foods.
  #[error("daily meal {track_id}: stored total {stored} != linked total {computed}")]
  InvariantViolation {
    track_id: String,
    stored:   i64,
    computed: i64,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Error::Core(_) | Error::UnknownFood(_) => ErrorKind::Validation,
      Error::MealEntryNotFound(_) | Error::DailyMealNotFound(_) => ErrorKind::NotFound,
      Error::Conflict(_) => ErrorKind::Conflict,
      Error::InvariantViolation { .. } => ErrorKind::InvariantViolation,
      Error::Database(e) => classify_database(e),
      Error::DateParse(_) | Error::Decode(_) => ErrorKind::Storage,
    }
  }
}

fn classify_database(e: &tokio_rusqlite::Error) -> ErrorKind {
  match e {
    tokio_rusqlite::Error::ConnectionClosed => ErrorKind::TransientStorage,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(f, _)) => {
      match f.code {
        ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => {
          ErrorKind::TransientStorage
        }
        ErrorCode::ConstraintViolation
          if matches!(
            f.extended_code,
            SQLITE_CONSTRAINT_UNIQUE | SQLITE_CONSTRAINT_PRIMARYKEY
          ) =>
        {
          ErrorKind::Conflict
        }
        _ => ErrorKind::Storage,
      }
    }
    _ => ErrorKind::Storage,
  }
}

/// `true` if `e` is a UNIQUE or PRIMARY KEY constraint failure.
pub(crate) fn is_unique_violation(e: &tokio_rusqlite::Error) -> bool {
  classify_database(e) == ErrorKind::Conflict
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sqlite_failure(code: i32) -> Error {
    Error::Database(tokio_rusqlite::Error::Rusqlite(
      rusqlite::Error::SqliteFailure(rusqlite::ffi::Error::new(code), None),
    ))
  }

  #[test]
  fn busy_and_locked_are_transient() {
    assert_eq!(
      sqlite_failure(rusqlite::ffi::SQLITE_BUSY).kind(),
      ErrorKind::TransientStorage
    );
    assert_eq!(
      sqlite_failure(rusqlite::ffi::SQLITE_LOCKED).kind(),
      ErrorKind::TransientStorage
    );
    assert_eq!(
      Error::Database(tokio_rusqlite::Error::ConnectionClosed).kind(),
      ErrorKind::TransientStorage
    );
  }

  #[test]
  fn unique_violation_is_conflict() {
    assert_eq!(sqlite_failure(SQLITE_CONSTRAINT_UNIQUE).kind(), ErrorKind::Conflict);
    // Foreign-key failures are not retryable conflicts.
    assert_eq!(
      sqlite_failure(rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY).kind(),
      ErrorKind::Storage
    );
  }

  #[test]
  fn unknown_food_is_validation() {
    assert_eq!(Error::UnknownFood("F9".into()).kind(), ErrorKind::Validation);
  }
}
