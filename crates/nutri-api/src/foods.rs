//! Handlers for `/foods` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/foods` | Catalog grouped by category |
//! | `POST` | `/foods` | Body: `{"name":"Rice","calories":130,...}` |
//! | `GET`  | `/foods/:id` | 404 if not found |

use std::{collections::BTreeMap, sync::Arc};

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use nutri_core::{
  food::{Food, NewFood},
  store::NutritionStore,
};

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

/// Foods keyed by category, each list ordered by name.
pub fn group_by_category(foods: Vec<Food>) -> BTreeMap<String, Vec<Food>> {
  let mut groups: BTreeMap<String, Vec<Food>> = BTreeMap::new();
  for food in foods {
    groups.entry(food.category.clone()).or_default().push(food);
  }
  groups
}

/// `GET /foods`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<BTreeMap<String, Vec<Food>>>, ApiError>
where
  S: NutritionStore,
{
  let foods = store.list_foods().await.map_err(ApiError::store)?;
  Ok(Json(group_by_category(foods)))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /foods`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewFood>,
) -> Result<impl IntoResponse, ApiError>
where
  S: NutritionStore,
{
  let food = store.add_food(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(food)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /foods/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<Json<Food>, ApiError>
where
  S: NutritionStore,
{
  let food = store
    .get_food(id.clone())
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("food {id} not found")))?;
  Ok(Json(food))
}
