//! Handlers for `/meals` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/meals` | Body: `{"meal_date":"2024-03-01","food_id":"..."}` |
//! | `GET`    | `/meals` | Required `?date=YYYY-MM-DD`; 404 if nothing logged |
//! | `DELETE` | `/meals/:link_id` | Removes one entry, returns the updated day |
//! | `GET`    | `/meals/monthly` | Optional `?month=YYYY-MM`, defaults to this month |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use nutri_core::{
  meal::{DailyMeal, DailyMeals, TrackId, month_bounds, parse_date, parse_month},
  store::NutritionStore,
};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, user::CurrentUser};

// ─── Log ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LogBody {
  /// Must match the authenticated user when present.
  pub user_id:   Option<String>,
  pub meal_date: String,
  pub food_id:   String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogResponse {
  pub track_id: TrackId,
  pub message:  String,
}

/// `POST /meals`
pub async fn log<S>(
  State(store): State<Arc<S>>,
  user: CurrentUser,
  Json(body): Json<LogBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: NutritionStore,
{
  if let Some(requested) = &body.user_id
    && *requested != user.user_id
  {
    return Err(ApiError::Unauthorized(
      "cannot log meals for another user".into(),
    ));
  }

  let date = parse_date(&body.meal_date)?;
  let track_id = store
    .log_meal(user.user_id, date, body.food_id)
    .await
    .map_err(ApiError::store)?;

  Ok((
    StatusCode::CREATED,
    Json(LogResponse { track_id, message: "meal logged".into() }),
  ))
}

// ─── Daily view ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DayParams {
  pub date: String,
}

/// `GET /meals?date=<YYYY-MM-DD>`
pub async fn daily<S>(
  State(store): State<Arc<S>>,
  user: CurrentUser,
  Query(params): Query<DayParams>,
) -> Result<Json<DailyMeals>, ApiError>
where
  S: NutritionStore,
{
  let date = parse_date(&params.date)?;
  let meals = store
    .get_daily_meals(user.user_id, date)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("no meals logged on {date}")))?;
  Ok(Json(meals))
}

// ─── Remove ───────────────────────────────────────────────────────────────────

/// `DELETE /meals/:link_id`
pub async fn remove<S>(
  State(store): State<Arc<S>>,
  user: CurrentUser,
  Path(link_id): Path<i64>,
) -> Result<Json<DailyMeal>, ApiError>
where
  S: NutritionStore,
{
  let daily = store
    .remove_meal(user.user_id, link_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(daily))
}

// ─── Monthly total ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MonthParams {
  pub month: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MonthlyCalories {
  pub month:          String,
  pub total_calories: i64,
}

/// `GET /meals/monthly[?month=<YYYY-MM>]`
pub async fn monthly<S>(
  State(store): State<Arc<S>>,
  user: CurrentUser,
  Query(params): Query<MonthParams>,
) -> Result<Json<MonthlyCalories>, ApiError>
where
  S: NutritionStore,
{
  let (first, last) = match params.month.as_deref() {
    Some(month) => parse_month(month)?,
    None => month_bounds(Utc::now().date_naive()),
  };

  let total_calories = store
    .calories_between(user.user_id, first, last)
    .await
    .map_err(ApiError::store)?;

  Ok(Json(MonthlyCalories {
    month: first.format("%Y-%m").to_string(),
    total_calories,
  }))
}
