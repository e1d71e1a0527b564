//! Handlers for `/calories`: BMR-based estimates and their history.

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use nutri_core::{
  calorie::{
    ActivityLevel, CalorieProfile, CalorieRequest, NewCalorieProfile, estimate,
    round2,
  },
  store::NutritionStore,
};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, user::CurrentUser};

#[derive(Debug, Serialize, Deserialize)]
pub struct EstimateResponse {
  pub activity: ActivityLevel,
  pub bmr:      f64,
  pub calories: f64,
}

/// `POST /calories`: estimate daily calories and record the profile.
pub async fn calculate<S>(
  State(store): State<Arc<S>>,
  user: CurrentUser,
  Json(body): Json<CalorieRequest>,
) -> Result<impl IntoResponse, ApiError>
where
  S: NutritionStore,
{
  let est = estimate(&body)?;
  store
    .save_calorie_profile(NewCalorieProfile::from_estimate(user.user_id, &body, &est))
    .await
    .map_err(ApiError::store)?;

  Ok((
    StatusCode::CREATED,
    Json(EstimateResponse {
      activity: est.activity,
      bmr:      round2(est.bmr),
      calories: round2(est.calories),
    }),
  ))
}

/// `GET /calories`
pub async fn history<S>(
  State(store): State<Arc<S>>,
  user: CurrentUser,
) -> Result<Json<Vec<CalorieProfile>>, ApiError>
where
  S: NutritionStore,
{
  let profiles = store
    .list_calorie_profiles(user.user_id)
    .await
    .map_err(ApiError::store)?
    .into_iter()
    .map(|p| CalorieProfile { calories: round2(p.calories), ..p })
    .collect();
  Ok(Json(profiles))
}
