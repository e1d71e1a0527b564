//! Handlers for `/plans` endpoints.

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use nutri_core::{meal::parse_date, plan::NewDietPlan, store::NutritionStore};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, user::CurrentUser};

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub calorie_goal: i64,
  /// Defaults to today.
  pub start_date:   Option<String>,
}

/// `POST /plans`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  user: CurrentUser,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: NutritionStore,
{
  let start_date = match body.start_date.as_deref() {
    Some(s) => parse_date(s)?,
    None => Utc::now().date_naive(),
  };

  let plan = store
    .create_diet_plan(NewDietPlan {
      user_id: user.user_id,
      calorie_goal: body.calorie_goal,
      start_date,
    })
    .await
    .map_err(ApiError::store)?;

  Ok((StatusCode::CREATED, Json(plan)))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CalorieGoal {
  pub calorie_goal: i64,
}

/// `GET /plans/current`
pub async fn current<S>(
  State(store): State<Arc<S>>,
  user: CurrentUser,
) -> Result<Json<CalorieGoal>, ApiError>
where
  S: NutritionStore,
{
  let calorie_goal = store
    .current_calorie_goal(user.user_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("no diet plan".into()))?;
  Ok(Json(CalorieGoal { calorie_goal }))
}
