//! Error types for `nutri-core`, plus the error taxonomy shared by every
//! backend.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid date {0:?}, expected YYYY-MM-DD")]
  InvalidDate(String),

  #[error("invalid month {0:?}, expected YYYY-MM")]
  InvalidMonth(String),

  #[error("invalid track id: {0:?}")]
  InvalidTrackId(String),

  #[error("unknown activity level: {0:?}")]
  UnknownActivity(String),

  #[error("{field} {reason}")]
  Invalid {
    field:  &'static str,
    reason: &'static str,
  },
}

impl Error {
  pub(crate) fn invalid(field: &'static str, reason: &'static str) -> Self {
    Self::Invalid { field, reason }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Taxonomy ────────────────────────────────────────────────────────────────

/// Coarse classification of a failure, independent of the backend that
/// produced it. The HTTP layer maps each kind onto a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// Bad input. Storage was not mutated.
  Validation,
  /// The addressed row does not exist.
  NotFound,
  /// A uniqueness constraint rejected the write. Retrying the whole operation
  /// is safe.
  Conflict,
  /// Busy, locked or disconnected storage. The unit of work was rolled back.
  TransientStorage,
  /// A stored aggregate disagrees with its recomputed value. Always a bug.
  InvariantViolation,
  /// Any other storage failure.
  Storage,
}

/// Implemented by every error type that can cross the store boundary.
pub trait Classify {
  fn kind(&self) -> ErrorKind;
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind { ErrorKind::Validation }
}

impl Classify for std::convert::Infallible {
  fn kind(&self) -> ErrorKind { match *self {} }
}
