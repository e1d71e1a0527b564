//! Diet plans: a calorie goal over a date range.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DietPlan {
  pub plan_id:      String,
  pub user_id:      String,
  pub start_date:   NaiveDate,
  pub end_date:     NaiveDate,
  /// Target kcal per day.
  pub calorie_goal: i64,
}

#[derive(Debug, Clone)]
pub struct NewDietPlan {
  pub user_id:      String,
  pub calorie_goal: i64,
  pub start_date:   NaiveDate,
}

impl NewDietPlan {
  pub fn validate(&self) -> Result<()> {
    crate::meal::validate_user_id(&self.user_id)?;
    if self.calorie_goal <= 0 {
      return Err(Error::invalid("calorie_goal", "must be positive"));
    }
    Ok(())
  }

  /// Plans run for one calendar month from their start date.
  pub fn end_date(&self) -> NaiveDate {
    self
      .start_date
      .checked_add_months(Months::new(1))
      .unwrap_or(NaiveDate::MAX)
  }

  pub fn into_plan(self, plan_id: String) -> DietPlan {
    let end_date = self.end_date();
    DietPlan {
      plan_id,
      user_id: self.user_id,
      start_date: self.start_date,
      end_date,
      calorie_goal: self.calorie_goal,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn plan(start: NaiveDate, goal: i64) -> NewDietPlan {
    NewDietPlan { user_id: "U1".into(), calorie_goal: goal, start_date: start }
  }

  #[test]
  fn plan_lasts_one_month() {
    let p = plan(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(), 1800);
    // Clamped to the last day of February.
    assert_eq!(p.end_date(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
  }

  #[test]
  fn goal_must_be_positive() {
    let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    assert!(plan(start, 0).validate().is_err());
    assert!(plan(start, 2000).validate().is_ok());
  }
}
