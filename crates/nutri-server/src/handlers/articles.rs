//! `POST /api/articles/search`: web articles for a query.

use axum::{Json, extract::State};
use nutri_api::ApiError;
use nutri_core::store::NutritionStore;
use serde::Deserialize;

use crate::{AppState, search::Article};

#[derive(Debug, Deserialize)]
pub struct SearchBody {
  pub query: String,
}

pub async fn handler<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<SearchBody>,
) -> Result<Json<Vec<Article>>, ApiError>
where
  S: NutritionStore + Clone + 'static,
{
  let query = body.query.trim();
  if query.is_empty() {
    return Err(ApiError::BadRequest("query must not be empty".into()));
  }
  let articles = state.search.search(query).await?;
  Ok(Json(articles))
}
