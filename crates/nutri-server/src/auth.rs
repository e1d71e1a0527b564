//! Password hashing, JWT issuance, and the bearer-token middleware.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::{
  extract::{Request, State},
  http::{HeaderMap, header},
  middleware::Next,
  response::Response,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use nutri_api::{ApiError, CurrentUser};
use nutri_core::{store::NutritionStore, user::User};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  error::{Error, Result},
};

/// Name of the cookie carrying the session token.
pub const TOKEN_COOKIE: &str = "token";

// ─── Passwords ───────────────────────────────────────────────────────────────

/// Hash `password` into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| Error::Hash(e.to_string()))
}

/// Check `password` against a stored PHC string.
pub fn verify_password(password: &str, phc: &str) -> Result<()> {
  let parsed = PasswordHash::new(phc).map_err(|_| Error::InvalidCredentials)?;
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .map_err(|_| Error::InvalidCredentials)
}

// ─── Tokens ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
  /// User id.
  pub sub:      String,
  pub username: String,
  pub iat:      i64,
  pub exp:      i64,
}

/// A signed token and its expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedToken {
  pub token:      String,
  pub expires_at: DateTime<Utc>,
}

/// HS256 signing and verification keys derived from one shared secret.
pub struct JwtKeys {
  encoding:   EncodingKey,
  decoding:   DecodingKey,
  validation: Validation,
  ttl:        Duration,
}

impl JwtKeys {
  pub fn new(secret: &str, ttl: Duration) -> Self {
    Self {
      encoding:   EncodingKey::from_secret(secret.as_bytes()),
      decoding:   DecodingKey::from_secret(secret.as_bytes()),
      validation: Validation::new(Algorithm::HS256),
      ttl,
    }
  }

  pub fn ttl(&self) -> Duration { self.ttl }

  pub fn issue(&self, user: &User) -> Result<IssuedToken> {
    let now = Utc::now();
    let expires_at = now + self.ttl;
    let claims = Claims {
      sub:      user.user_id.clone(),
      username: user.username.clone(),
      iat:      now.timestamp(),
      exp:      expires_at.timestamp(),
    };
    let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
      .map_err(Error::Sign)?;
    Ok(IssuedToken { token, expires_at })
  }

  /// Check signature and expiry and return the claims.
  pub fn verify(&self, token: &str) -> Result<Claims> {
    jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
      .map(|data| data.claims)
      .map_err(Error::InvalidToken)
  }
}

/// The `Set-Cookie` value for a freshly issued token.
pub fn token_cookie(issued: &IssuedToken, ttl: Duration) -> String {
  format!(
    "{TOKEN_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
    issued.token,
    ttl.num_seconds()
  )
}

/// The request's token: `Authorization: Bearer …` first, then the cookie.
fn request_token(headers: &HeaderMap) -> Option<&str> {
  let bearer = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim);
  if bearer.is_some() {
    return bearer;
  }

  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(name, _)| *name == TOKEN_COOKIE)
    .map(|(_, value)| value)
}

// ─── Middleware ──────────────────────────────────────────────────────────────

/// Reject requests without a valid token; otherwise attach [`CurrentUser`].
pub async fn require_auth<S>(
  State(state): State<AppState<S>>,
  mut req: Request,
  next: Next,
) -> Result<Response, ApiError>
where
  S: NutritionStore + Clone + 'static,
{
  let claims = {
    let token = request_token(req.headers()).ok_or(Error::MissingToken)?;
    state.jwt.verify(token)?
  };

  req.extensions_mut().insert(CurrentUser {
    user_id:  claims.sub,
    username: claims.username,
  });
  Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::HeaderValue;
  use chrono::NaiveDate;

  fn user() -> User {
    User {
      user_id:    "U1".into(),
      name:       "Ada".into(),
      username:   "ada".into(),
      email:      "ada@example.com".into(),
      birthdate:  NaiveDate::from_ymd_opt(1994, 5, 17).unwrap(),
      height:     165.0,
      weight:     60.0,
      created_at: Utc::now(),
    }
  }

  #[test]
  fn password_round_trip() {
    let hash = hash_password("hunter2").unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(verify_password("hunter2", &hash).is_ok());
    assert!(matches!(
      verify_password("wrong", &hash),
      Err(Error::InvalidCredentials)
    ));
    assert!(matches!(
      verify_password("hunter2", "not-a-phc-string"),
      Err(Error::InvalidCredentials)
    ));
  }

  #[test]
  fn issued_token_verifies() {
    let keys = JwtKeys::new("secret", Duration::hours(1));
    let issued = keys.issue(&user()).unwrap();
    let claims = keys.verify(&issued.token).unwrap();
    assert_eq!(claims.sub, "U1");
    assert_eq!(claims.username, "ada");
    assert_eq!(claims.exp, issued.expires_at.timestamp());
  }

  #[test]
  fn token_from_other_secret_is_rejected() {
    let issued = JwtKeys::new("secret", Duration::hours(1)).issue(&user()).unwrap();
    let other = JwtKeys::new("other", Duration::hours(1));
    assert!(matches!(other.verify(&issued.token), Err(Error::InvalidToken(_))));
  }

  #[test]
  fn expired_token_is_rejected() {
    let keys = JwtKeys::new("secret", Duration::hours(-2));
    let issued = keys.issue(&user()).unwrap();
    assert!(matches!(keys.verify(&issued.token), Err(Error::InvalidToken(_))));
  }

  #[test]
  fn token_is_read_from_header_or_cookie() {
    let mut headers = HeaderMap::new();
    assert_eq!(request_token(&headers), None);

    headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; token=abc"));
    assert_eq!(request_token(&headers), Some("abc"));

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
    assert_eq!(request_token(&headers), Some("xyz"));
  }
}
