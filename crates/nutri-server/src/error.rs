//! Error types for authentication and the outbound provider clients.

use nutri_api::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Unknown email or wrong password; the two are not distinguished.
  #[error("invalid email or password")]
  InvalidCredentials,

  #[error("missing bearer token")]
  MissingToken,

  #[error("invalid token: {0}")]
  InvalidToken(#[source] jsonwebtoken::errors::Error),

  #[error("token signing failed: {0}")]
  Sign(#[source] jsonwebtoken::errors::Error),

  #[error("password hashing failed: {0}")]
  Hash(String),

  #[error("{0} is not configured")]
  NotConfigured(&'static str),

  #[error("upstream request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("upstream returned {status}")]
  UpstreamStatus { status: u16 },

  #[error("upstream response contained no text")]
  EmptyResponse,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for ApiError {
  fn from(e: Error) -> Self {
    match e {
      Error::InvalidCredentials | Error::MissingToken | Error::InvalidToken(_) => {
        ApiError::Unauthorized(e.to_string())
      }
      Error::Sign(_) | Error::Hash(_) => ApiError::Internal(e.to_string()),
      Error::NotConfigured(_)
      | Error::Http(_)
      | Error::UpstreamStatus { .. }
      | Error::EmptyResponse => ApiError::Upstream(e.to_string()),
    }
  }
}
