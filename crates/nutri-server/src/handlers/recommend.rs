//! `POST /api/recommendations`: an AI-generated meal plan.

use axum::{Json, extract::State};
use nutri_api::ApiError;
use nutri_core::store::NutritionStore;
use serde::{Deserialize, Serialize};

use crate::{AppState, genai::meal_plan_prompt};

#[derive(Debug, Deserialize)]
pub struct RecommendBody {
  pub days:     String,
  pub calories: String,
  pub cuisine:  String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Recommendation {
  pub recommendation: String,
}

pub async fn handler<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<RecommendBody>,
) -> Result<Json<Recommendation>, ApiError>
where
  S: NutritionStore + Clone + 'static,
{
  for (field, value) in [
    ("days", &body.days),
    ("calories", &body.calories),
    ("cuisine", &body.cuisine),
  ] {
    if value.trim().is_empty() {
      return Err(ApiError::BadRequest(format!("{field} must not be empty")));
    }
  }

  let prompt = meal_plan_prompt(body.days.trim(), body.calories.trim(), body.cuisine.trim());
  tracing::debug!(%prompt, "requesting meal plan");

  let recommendation = state.genai.generate(&prompt).await?;
  Ok(Json(Recommendation { recommendation }))
}
