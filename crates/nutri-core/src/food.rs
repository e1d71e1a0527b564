//! Food catalog entries.
//!
//! Foods are read-only from the meal log's point of view: logging a meal only
//! ever links to an existing food and reads its `calories`.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Category assigned when the caller does not provide one.
pub const DEFAULT_CATEGORY: &str = "food";

/// A food item with its nutritional values per serving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
  pub food_id:       String,
  pub name:          String,
  /// Serving size in grams.
  pub serving:       i64,
  /// Energy per serving in kcal.
  pub calories:      i64,
  pub fat:           f64,
  pub carbohydrates: f64,
  pub protein:       f64,
  /// Grams of fiber, when known.
  pub fiber:         Option<f64>,
  /// Milligrams of calcium, when known.
  pub calcium:       Option<i64>,
  pub category:      String,
}

/// Input to [`NutritionStore::add_food`](crate::store::NutritionStore::add_food).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFood {
  pub name:          String,
  #[serde(default)]
  pub serving:       i64,
  pub calories:      i64,
  #[serde(default)]
  pub fat:           f64,
  #[serde(default)]
  pub carbohydrates: f64,
  #[serde(default)]
  pub protein:       f64,
  pub fiber:         Option<f64>,
  pub calcium:       Option<i64>,
  #[serde(default = "default_category")]
  pub category:      String,
}

fn default_category() -> String { DEFAULT_CATEGORY.to_owned() }

impl NewFood {
  /// A food with only a name and calories; every other field zeroed.
  pub fn new(name: impl Into<String>, calories: i64) -> Self {
    Self {
      name: name.into(),
      serving: 0,
      calories,
      fat: 0.0,
      carbohydrates: 0.0,
      protein: 0.0,
      fiber: None,
      calcium: None,
      category: default_category(),
    }
  }

  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::invalid("name", "must not be empty"));
    }
    if self.calories < 0 {
      return Err(Error::invalid("calories", "must not be negative"));
    }
    if self.serving < 0 {
      return Err(Error::invalid("serving", "must not be negative"));
    }
    if self.fat < 0.0 || self.carbohydrates < 0.0 || self.protein < 0.0 {
      return Err(Error::invalid("macronutrients", "must not be negative"));
    }
    if self.category.trim().is_empty() {
      return Err(Error::invalid("category", "must not be empty"));
    }
    Ok(())
  }

  pub fn into_food(self, food_id: String) -> Food {
    Food {
      food_id,
      name:          self.name,
      serving:       self.serving,
      calories:      self.calories,
      fat:           self.fat,
      carbohydrates: self.carbohydrates,
      protein:       self.protein,
      fiber:         self.fiber,
      calcium:       self.calcium,
      category:      self.category,
    }
  }
}
