//! JSON REST API for nutrishe.
//!
//! Exposes an axum [`Router`] backed by any [`nutri_core::store::NutritionStore`].
//! Authentication, TLS, and transport concerns are the caller's
//! responsibility: every handler expects a [`CurrentUser`] in the request
//! extensions.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", nutri_api::api_router(store.clone()))
//! ```

pub mod calories;
pub mod error;
pub mod foods;
pub mod meals;
pub mod plans;
pub mod user;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post},
};
use nutri_core::store::NutritionStore;

pub use error::ApiError;
pub use user::CurrentUser;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: NutritionStore + 'static,
{
  Router::new()
    .route("/me", get(user::me::<S>))
    // Food catalog
    .route("/foods", get(foods::list::<S>).post(foods::create::<S>))
    .route("/foods/{id}", get(foods::get_one::<S>))
    // Meal log
    .route("/meals", get(meals::daily::<S>).post(meals::log::<S>))
    .route("/meals/monthly", get(meals::monthly::<S>))
    .route("/meals/{link_id}", delete(meals::remove::<S>))
    // Diet plans
    .route("/plans", post(plans::create::<S>))
    .route("/plans/current", get(plans::current::<S>))
    // Calorie estimates
    .route("/calories", get(calories::history::<S>).post(calories::calculate::<S>))
    .with_state(store)
}
