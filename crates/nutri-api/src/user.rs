//! The authenticated caller, and `/me`.
//!
//! Authentication itself happens in front of this router: whatever verifies
//! the request inserts a [`CurrentUser`] into its extensions.

use std::sync::Arc;

use axum::{
  Json,
  extract::{FromRequestParts, State},
  http::request::Parts,
};
use nutri_core::{store::NutritionStore, user::User};

use crate::error::ApiError;

/// The user a request was authenticated as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
  pub user_id:  String,
  pub username: String,
}

impl<S> FromRequestParts<S> for CurrentUser
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    parts
      .extensions
      .get::<CurrentUser>()
      .cloned()
      .ok_or_else(|| ApiError::Unauthorized("authentication required".into()))
  }
}

/// `GET /me`
pub async fn me<S>(
  State(store): State<Arc<S>>,
  user: CurrentUser,
) -> Result<Json<User>, ApiError>
where
  S: NutritionStore,
{
  let found = store
    .get_user(user.user_id.clone())
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {} not found", user.user_id)))?;
  Ok(Json(found))
}
