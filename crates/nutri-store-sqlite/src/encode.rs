//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and calendar dates as
//! `YYYY-MM-DD`, so lexical order matches chronological order.

use chrono::{DateTime, NaiveDate, Utc};
use nutri_core::{
  calorie::{ActivityLevel, CalorieProfile},
  food::Food,
  meal::{DATE_FORMAT, DailyMeal, MealEntry, TrackId},
  plan::DietPlan,
  user::User,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── ActivityLevel ───────────────────────────────────────────────────────────

pub fn encode_activity(a: ActivityLevel) -> &'static str { a.into() }

pub fn decode_activity(s: &str) -> Result<ActivityLevel> {
  ActivityLevel::parse(s)
    .map_err(|_| Error::Decode(format!("unknown activity level: {s:?}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`food_from_row`], for `SELECT`s over `food f`.
pub const FOOD_COLUMNS: &str = "f.food_id, f.name, f.serving, f.calories, f.fat, \
   f.carbohydrates, f.protein, f.fiber, f.calcium, f.category";

/// Read a [`Food`] from ten consecutive columns starting at `offset`.
pub fn food_from_row(row: &rusqlite::Row<'_>, offset: usize) -> rusqlite::Result<Food> {
  Ok(Food {
    food_id:       row.get(offset)?,
    name:          row.get(offset + 1)?,
    serving:       row.get(offset + 2)?,
    calories:      row.get(offset + 3)?,
    fat:           row.get(offset + 4)?,
    carbohydrates: row.get(offset + 5)?,
    protein:       row.get(offset + 6)?,
    fiber:         row.get(offset + 7)?,
    calcium:       row.get(offset + 8)?,
    category:      row.get(offset + 9)?,
  })
}

/// Raw strings read directly from a `daily_meal` row.
#[derive(Debug)]
pub struct RawDailyMeal {
  pub track_id:       String,
  pub user_id:        String,
  pub meal_date:      String,
  pub total_calories: i64,
}

impl RawDailyMeal {
  pub const COLUMNS: &'static str = "track_id, user_id, meal_date, total_calories";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      track_id:       row.get(0)?,
      user_id:        row.get(1)?,
      meal_date:      row.get(2)?,
      total_calories: row.get(3)?,
    })
  }

  pub fn into_daily_meal(self) -> Result<DailyMeal> {
    Ok(DailyMeal {
      track_id:       TrackId::parse(&self.track_id)?,
      user_id:        self.user_id,
      meal_date:      decode_date(&self.meal_date)?,
      total_calories: self.total_calories,
    })
  }
}

/// A `meal_detail` row joined with its food.
pub struct RawMealEntry {
  pub link_id:   i64,
  pub logged_at: String,
  pub food:      Food,
}

impl RawMealEntry {
  pub fn into_entry(self) -> Result<MealEntry> {
    Ok(MealEntry {
      link_id:   self.link_id,
      logged_at: decode_dt(&self.logged_at)?,
      food:      self.food,
    })
  }
}

pub struct RawUser {
  pub user_id:    String,
  pub name:       String,
  pub username:   String,
  pub email:      String,
  pub birthdate:  String,
  pub height:     f64,
  pub weight:     f64,
  pub created_at: String,
}

impl RawUser {
  pub const COLUMNS: &'static str =
    "user_id, name, username, email, birthdate, height, weight, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:    row.get(0)?,
      name:       row.get(1)?,
      username:   row.get(2)?,
      email:      row.get(3)?,
      birthdate:  row.get(4)?,
      height:     row.get(5)?,
      weight:     row.get(6)?,
      created_at: row.get(7)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:    self.user_id,
      name:       self.name,
      username:   self.username,
      email:      self.email,
      birthdate:  decode_date(&self.birthdate)?,
      height:     self.height,
      weight:     self.weight,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawDietPlan {
  pub plan_id:      String,
  pub user_id:      String,
  pub start_date:   String,
  pub end_date:     String,
  pub calorie_goal: i64,
}

impl RawDietPlan {
  pub fn into_plan(self) -> Result<DietPlan> {
    Ok(DietPlan {
      plan_id:      self.plan_id,
      user_id:      self.user_id,
      start_date:   decode_date(&self.start_date)?,
      end_date:     decode_date(&self.end_date)?,
      calorie_goal: self.calorie_goal,
    })
  }
}

pub struct RawCalorieProfile {
  pub profile_id:  i64,
  pub user_id:     String,
  pub age:         i64,
  pub height:      f64,
  pub weight:      f64,
  pub activity:    String,
  pub calories:    f64,
  pub recorded_at: String,
}

impl RawCalorieProfile {
  pub fn into_profile(self) -> Result<CalorieProfile> {
    Ok(CalorieProfile {
      profile_id:  self.profile_id,
      user_id:     self.user_id,
      age:         self.age,
      height:      self.height,
      weight:      self.weight,
      activity:    decode_activity(&self.activity)?,
      calories:    self.calories,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}
