//! Handlers for `/auth` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/register` | 201 with the new user; 409 on duplicate username or email |
//! | `POST` | `/auth/login` | `{"token","expires_at"}` plus a `token` cookie |

use axum::{
  Json,
  extract::State,
  http::{StatusCode, header},
  response::IntoResponse,
};
use nutri_api::ApiError;
use nutri_core::{meal::parse_date, store::NutritionStore, user::NewUser};
use serde::Deserialize;

use crate::{
  AppState,
  auth::{self, token_cookie},
  error::Error,
};

// ─── Register ─────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterBody {
  pub name:      String,
  pub username:  String,
  pub email:     String,
  pub password:  String,
  /// `YYYY-MM-DD`.
  pub birthdate: String,
  #[serde(default)]
  pub height:    f64,
  #[serde(default)]
  pub weight:    f64,
}

/// Run a CPU-bound hashing step off the async runtime.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
  F: FnOnce() -> crate::error::Result<T> + Send + 'static,
  T: Send + 'static,
{
  tokio::task::spawn_blocking(f)
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?
    .map_err(ApiError::from)
}

/// `POST /auth/register`
pub async fn register<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: NutritionStore + Clone + 'static,
{
  if body.password.is_empty() {
    return Err(ApiError::BadRequest("password must not be empty".into()));
  }
  let birthdate = parse_date(&body.birthdate)?;

  let password = body.password;
  let password_hash = blocking(move || auth::hash_password(&password)).await?;

  let user = state
    .store
    .create_user(NewUser {
      name: body.name,
      username: body.username,
      email: body.email,
      password_hash,
      birthdate,
      height: body.height,
      weight: body.weight,
    })
    .await
    .map_err(ApiError::store)?;

  tracing::info!(user_id = %user.user_id, username = %user.username, "user registered");
  Ok((StatusCode::CREATED, Json(user)))
}

// ─── Login ────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginBody {
  pub email:    String,
  pub password: String,
}

/// `POST /auth/login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: NutritionStore + Clone + 'static,
{
  let creds = state
    .store
    .find_credentials(body.email)
    .await
    .map_err(ApiError::store)?
    .ok_or(Error::InvalidCredentials)?;

  let (password, phc) = (body.password, creds.password_hash);
  blocking(move || auth::verify_password(&password, &phc)).await?;

  let issued = state.jwt.issue(&creds.user)?;
  let cookie = token_cookie(&issued, state.jwt.ttl());

  tracing::info!(user_id = %creds.user.user_id, "user logged in");
  Ok(([(header::SET_COOKIE, cookie)], Json(issued)))
}
