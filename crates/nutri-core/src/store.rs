//! The `NutritionStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `nutri-store-sqlite`).
//! Higher layers (`nutri-api`, `nutri-server`) depend on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use chrono::NaiveDate;

use crate::{
  Classify,
  calorie::{CalorieProfile, NewCalorieProfile},
  food::{Food, NewFood},
  meal::{DailyMeal, DailyMeals, TrackId},
  plan::{DietPlan, NewDietPlan},
  user::{NewUser, User, UserCredentials},
};

/// Abstraction over a nutrishe storage backend.
///
/// Every write is a single unit of work: it either applies completely or
/// leaves storage untouched. Errors are classified through [`Classify`] so
/// callers can tell bad input from conflicts and transient failures.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait NutritionStore: Send + Sync {
  type Error: std::error::Error + Classify + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Persist a new user. Fails with a conflict if the username or email is
  /// already registered.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    user_id: String,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Look up a user and its password hash by email, for login.
  fn find_credentials(
    &self,
    email: String,
  ) -> impl Future<Output = Result<Option<UserCredentials>, Self::Error>> + Send + '_;

  // ── Food catalog ──────────────────────────────────────────────────────

  /// Add a food under a freshly generated id.
  fn add_food(
    &self,
    input: NewFood,
  ) -> impl Future<Output = Result<Food, Self::Error>> + Send + '_;

  /// Add a food under a caller-supplied id. Fails with a conflict if the id is
  /// already taken.
  fn add_food_with_id(
    &self,
    food_id: String,
    input: NewFood,
  ) -> impl Future<Output = Result<Food, Self::Error>> + Send + '_;

  fn get_food(
    &self,
    food_id: String,
  ) -> impl Future<Output = Result<Option<Food>, Self::Error>> + Send + '_;

  fn list_foods(&self) -> impl Future<Output = Result<Vec<Food>, Self::Error>> + Send + '_;

  // ── Meal log ──────────────────────────────────────────────────────────

  /// Log `food_id` against the daily meal of `(user_id, date)`, creating the
  /// daily meal on first use, and recompute its calorie total from all linked
  /// foods. Returns the track id of the daily meal.
  ///
  /// Atomic: an unknown food or any storage failure leaves no trace, including
  /// a daily meal that would have been created by this call.
  fn log_meal(
    &self,
    user_id: String,
    date: NaiveDate,
    food_id: String,
  ) -> impl Future<Output = Result<TrackId, Self::Error>> + Send + '_;

  /// Remove one logged entry of `user_id` and recompute its daily meal's
  /// total. Entries belonging to other users are reported as not found.
  fn remove_meal(
    &self,
    user_id: String,
    link_id: i64,
  ) -> impl Future<Output = Result<DailyMeal, Self::Error>> + Send + '_;

  /// The daily meal of `(user_id, date)` with all of its entries, or `None` if
  /// nothing has been logged that day.
  fn get_daily_meals(
    &self,
    user_id: String,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Option<DailyMeals>, Self::Error>> + Send + '_;

  /// Sum of daily totals for `user_id` between `from` and `to`, inclusive.
  fn calories_between(
    &self,
    user_id: String,
    from: NaiveDate,
    to: NaiveDate,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  // ── Diet plans ────────────────────────────────────────────────────────

  fn create_diet_plan(
    &self,
    input: NewDietPlan,
  ) -> impl Future<Output = Result<DietPlan, Self::Error>> + Send + '_;

  /// The calorie goal of the user's plan with the latest end date.
  fn current_calorie_goal(
    &self,
    user_id: String,
  ) -> impl Future<Output = Result<Option<i64>, Self::Error>> + Send + '_;

  // ── Calorie profiles ──────────────────────────────────────────────────

  fn save_calorie_profile(
    &self,
    input: NewCalorieProfile,
  ) -> impl Future<Output = Result<CalorieProfile, Self::Error>> + Send + '_;

  /// All stored profiles for a user, oldest first.
  fn list_calorie_profiles(
    &self,
    user_id: String,
  ) -> impl Future<Output = Result<Vec<CalorieProfile>, Self::Error>> + Send + '_;
}
