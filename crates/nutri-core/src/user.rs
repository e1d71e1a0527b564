//! Registered users.
//!
//! Password hashing happens above this layer; the store only ever sees the
//! finished PHC string.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
  pub user_id:    String,
  pub name:       String,
  pub username:   String,
  pub email:      String,
  pub birthdate:  NaiveDate,
  /// Centimetres.
  pub height:     f64,
  /// Kilograms.
  pub weight:     f64,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
  pub name:          String,
  pub username:      String,
  pub email:         String,
  pub password_hash: String,
  pub birthdate:     NaiveDate,
  pub height:        f64,
  pub weight:        f64,
}

impl NewUser {
  pub fn validate(&self) -> Result<()> {
    if self.username.trim().is_empty() {
      return Err(Error::invalid("username", "must not be empty"));
    }
    if !self.email.contains('@') {
      return Err(Error::invalid("email", "must be an email address"));
    }
    if self.password_hash.is_empty() {
      return Err(Error::invalid("password", "must not be empty"));
    }
    if self.height < 0.0 || self.weight < 0.0 {
      return Err(Error::invalid("height/weight", "must not be negative"));
    }
    Ok(())
  }
}

/// A user row together with its stored password hash, for login checks.
#[derive(Debug, Clone)]
pub struct UserCredentials {
  pub user:          User,
  pub password_hash: String,
}
