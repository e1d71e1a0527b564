//! Daily energy requirement estimates.
//!
//! BMR uses the revised Harris–Benedict equation (female form); total daily
//! energy expenditure is BMR scaled by an activity multiplier.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::{Error, Result};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, IntoStaticStr,
  Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
  Sedentary,
  Light,
  Moderate,
  Active,
  #[strum(serialize = "very active")]
  #[serde(rename = "very active")]
  VeryActive,
}

impl ActivityLevel {
  pub fn multiplier(self) -> f64 {
    match self {
      Self::Sedentary  => 1.2,
      Self::Light      => 1.375,
      Self::Moderate   => 1.55,
      Self::Active     => 1.725,
      Self::VeryActive => 1.9,
    }
  }

  /// Parse a user-supplied level, ignoring case and surrounding whitespace.
  pub fn parse(s: &str) -> Result<Self> {
    Self::from_str(s.trim()).map_err(|_| Error::UnknownActivity(s.to_owned()))
  }
}

/// Body metrics submitted for a calorie estimate.
#[derive(Debug, Clone, Deserialize)]
pub struct CalorieRequest {
  pub age:      i64,
  /// Centimetres.
  pub height:   f64,
  /// Kilograms.
  pub weight:   f64,
  pub activity: String,
}

/// Result of [`estimate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalorieEstimate {
  pub activity: ActivityLevel,
  pub bmr:      f64,
  pub calories: f64,
}

pub fn bmr(age: i64, height_cm: f64, weight_kg: f64) -> f64 {
  447.593 + 9.247 * weight_kg + 3.098 * height_cm - 4.330 * age as f64
}

/// Validate `req` and compute its BMR and activity-scaled daily calories.
pub fn estimate(req: &CalorieRequest) -> Result<CalorieEstimate> {
  if req.age <= 0 {
    return Err(Error::invalid("age", "must be positive"));
  }
  if req.height <= 0.0 {
    return Err(Error::invalid("height", "must be positive"));
  }
  if req.weight <= 0.0 {
    return Err(Error::invalid("weight", "must be positive"));
  }
  let activity = ActivityLevel::parse(&req.activity)?;
  let bmr = bmr(req.age, req.height, req.weight);
  Ok(CalorieEstimate { activity, bmr, calories: bmr * activity.multiplier() })
}

/// Round to two decimal places for display.
pub fn round2(v: f64) -> f64 { (v * 100.0).round() / 100.0 }

// ─── Stored profiles ─────────────────────────────────────────────────────────

/// A persisted calorie estimate for a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalorieProfile {
  pub profile_id:  i64,
  pub user_id:     String,
  pub age:         i64,
  pub height:      f64,
  pub weight:      f64,
  pub activity:    ActivityLevel,
  pub calories:    f64,
  pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCalorieProfile {
  pub user_id:  String,
  pub age:      i64,
  pub height:   f64,
  pub weight:   f64,
  pub activity: ActivityLevel,
  pub calories: f64,
}

impl NewCalorieProfile {
  pub fn from_estimate(
    user_id: String,
    req: &CalorieRequest,
    estimate: &CalorieEstimate,
  ) -> Self {
    Self {
      user_id,
      age:      req.age,
      height:   req.height,
      weight:   req.weight,
      activity: estimate.activity,
      calories: estimate.calories,
    }
  }
}
