//! [`SqliteStore`], the SQLite implementation of [`NutritionStore`].

use std::{path::Path, time::Duration};

use chrono::{NaiveDate, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use nutri_core::{
  calorie::{CalorieProfile, NewCalorieProfile},
  food::{Food, NewFood},
  meal::{DailyMeal, DailyMeals, TrackId, validate_user_id},
  plan::{DietPlan, NewDietPlan},
  store::NutritionStore,
  user::{NewUser, User, UserCredentials},
};

use crate::{
  Error, Result,
  encode::{
    FOOD_COLUMNS, RawCalorieProfile, RawDailyMeal, RawDietPlan, RawMealEntry,
    RawUser, encode_activity, encode_date, encode_dt, food_from_row,
  },
  error::is_unique_violation,
  meal_log::{self, LogOutcome},
  schema::{SCHEMA, SCHEMA_VERSION},
};

// ─── Options ─────────────────────────────────────────────────────────────────

/// Connection-level settings applied when the store is opened.
#[derive(Debug, Clone)]
pub struct StoreOptions {
  /// How long a statement waits on a locked database before failing with
  /// `SQLITE_BUSY`.
  pub busy_timeout: Duration,
}

impl Default for StoreOptions {
  fn default() -> Self { Self { busy_timeout: Duration::from_secs(5) } }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A nutrishe store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All clones
/// share one connection thread, which executes calls one at a time.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` with default options.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    Self::open_with(path, StoreOptions::default()).await
  }

  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open_with(path: impl AsRef<Path>, options: StoreOptions) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init(options).await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init(StoreOptions::default()).await?;
    Ok(store)
  }

  async fn init(&self, options: StoreOptions) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.busy_timeout(options.busy_timeout)?;
        conn.pragma_update(None, "foreign_keys", true)?;

        let version: i64 =
          conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
        if version < SCHEMA_VERSION {
          conn.execute_batch(SCHEMA)?;
        }
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Recompute a daily meal's total from its linked foods and return it.
  pub async fn recompute_daily_total(&self, track_id: &TrackId) -> Result<i64> {
    let id = track_id.to_string();
    self
      .conn
      .call(move |conn| Ok(meal_log::recompute_in_tx(conn, &id)?))
      .await?
      .ok_or_else(|| Error::DailyMealNotFound(track_id.to_string()))
  }

  async fn insert_food(&self, food: Food) -> Result<Food> {
    let row = food.clone();
    let inserted = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO food (
             food_id, name, serving, calories, fat,
             carbohydrates, protein, fiber, calcium, category
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            row.food_id,
            row.name,
            row.serving,
            row.calories,
            row.fat,
            row.carbohydrates,
            row.protein,
            row.fiber,
            row.calcium,
            row.category,
          ],
        )?;
        Ok(())
      })
      .await;

    match inserted {
      Ok(()) => Ok(food),
      Err(e) if is_unique_violation(&e) => {
        Err(Error::Conflict(format!("food {} already exists", food.food_id)))
      }
      Err(e) => Err(e.into()),
    }
  }

  #[cfg(test)]
  pub(crate) async fn count_rows(&self, table: &'static str) -> Result<i64> {
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?)
        })
        .await?,
    )
  }

  #[cfg(test)]
  pub(crate) async fn execute_raw(&self, sql: &'static str) -> Result<usize> {
    Ok(self.conn.call(move |conn| Ok(conn.execute(sql, [])?)).await?)
  }
}

// ─── NutritionStore impl ─────────────────────────────────────────────────────

impl NutritionStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<User> {
    input.validate()?;

    let user = User {
      user_id:    Uuid::new_v4().to_string(),
      name:       input.name,
      username:   input.username,
      email:      input.email,
      birthdate:  input.birthdate,
      height:     input.height,
      weight:     input.weight,
      created_at: Utc::now(),
    };

    let row           = user.clone();
    let birthdate_str = encode_date(user.birthdate);
    let created_str   = encode_dt(user.created_at);
    let password_hash = input.password_hash;

    let inserted = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (
             user_id, name, username, email, password_hash,
             birthdate, height, weight, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            row.user_id,
            row.name,
            row.username,
            row.email,
            password_hash,
            birthdate_str,
            row.height,
            row.weight,
            created_str,
          ],
        )?;
        Ok(())
      })
      .await;

    match inserted {
      Ok(()) => Ok(user),
      Err(e) if is_unique_violation(&e) => {
        Err(Error::Conflict("username or email already registered".into()))
      }
      Err(e) => Err(e.into()),
    }
  }

  async fn get_user(&self, user_id: String) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {} FROM users WHERE user_id = ?1", RawUser::COLUMNS),
            rusqlite::params![user_id],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn find_credentials(&self, email: String) -> Result<Option<UserCredentials>> {
    let raw: Option<(RawUser, String)> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {}, password_hash FROM users WHERE email = ?1",
              RawUser::COLUMNS
            ),
            rusqlite::params![email],
            |row| Ok((RawUser::from_row(row)?, row.get(8)?)),
          )
          .optional()?)
      })
      .await?;

    raw
      .map(|(user, password_hash)| {
        Ok(UserCredentials { user: user.into_user()?, password_hash })
      })
      .transpose()
  }

  // ── Food catalog ──────────────────────────────────────────────────────────

  async fn add_food(&self, input: NewFood) -> Result<Food> {
    input.validate()?;
    self.insert_food(input.into_food(Uuid::new_v4().to_string())).await
  }

  async fn add_food_with_id(&self, food_id: String, input: NewFood) -> Result<Food> {
    if food_id.trim().is_empty() {
      return Err(
        nutri_core::Error::Invalid { field: "food_id", reason: "must not be empty" }.into(),
      );
    }
    input.validate()?;
    self.insert_food(input.into_food(food_id)).await
  }

  async fn get_food(&self, food_id: String) -> Result<Option<Food>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(conn
            .query_row(
              &format!("SELECT {FOOD_COLUMNS} FROM food f WHERE f.food_id = ?1"),
              rusqlite::params![food_id],
              |row| food_from_row(row, 0),
            )
            .optional()?)
        })
        .await?,
    )
  }

  async fn list_foods(&self) -> Result<Vec<Food>> {
    Ok(
      self
        .conn
        .call(|conn| {
          let mut stmt = conn.prepare(&format!(
            "SELECT {FOOD_COLUMNS} FROM food f ORDER BY f.category, f.name"
          ))?;
          let rows = stmt
            .query_map([], |row| food_from_row(row, 0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  // ── Meal log ──────────────────────────────────────────────────────────────

  async fn log_meal(
    &self,
    user_id: String,
    date:    NaiveDate,
    food_id: String,
  ) -> Result<TrackId> {
    validate_user_id(&user_id)?;

    let date_str      = encode_date(date);
    let logged_at_str = encode_dt(Utc::now());
    let (user, food)  = (user_id.clone(), food_id.clone());

    let outcome = self
      .conn
      .call(move |conn| {
        Ok(meal_log::log_meal(conn, &user, &date_str, &food, &logged_at_str)?)
      })
      .await;

    match outcome {
      Ok(LogOutcome::Logged { track_id, created, total }) => {
        tracing::info!(%track_id, %user_id, %date, %food_id, created, total, "meal logged");
        Ok(TrackId::parse(&track_id)?)
      }
      Ok(LogOutcome::UnknownFood) => {
        tracing::warn!(%user_id, %date, %food_id, "meal log rolled back: unknown food");
        Err(Error::UnknownFood(food_id))
      }
      Err(e) => {
        tracing::warn!(%user_id, %date, %food_id, error = %e, "meal log rolled back");
        Err(e.into())
      }
    }
  }

  async fn remove_meal(&self, user_id: String, link_id: i64) -> Result<DailyMeal> {
    let raw = self
      .conn
      .call(move |conn| Ok(meal_log::remove_meal(conn, &user_id, link_id)?))
      .await?
      .ok_or(Error::MealEntryNotFound(link_id))?;

    let daily = raw.into_daily_meal()?;
    tracing::info!(link_id, track_id = %daily.track_id, total = daily.total_calories, "meal entry removed");
    Ok(daily)
  }

  async fn get_daily_meals(
    &self,
    user_id: String,
    date:    NaiveDate,
  ) -> Result<Option<DailyMeals>> {
    let date_str = encode_date(date);

    let raw: Option<(RawDailyMeal, Vec<RawMealEntry>)> = self
      .conn
      .call(move |conn| {
        // Both reads must see the same committed state.
        let tx = conn.transaction()?;

        let daily = tx
          .query_row(
            &format!(
              "SELECT {} FROM daily_meal WHERE user_id = ?1 AND meal_date = ?2",
              RawDailyMeal::COLUMNS
            ),
            rusqlite::params![user_id, date_str],
            RawDailyMeal::from_row,
          )
          .optional()?;

        let Some(daily) = daily else { return Ok(None) };

        let entries = {
          let mut stmt = tx.prepare(&format!(
            "SELECT md.link_id, md.logged_at, {FOOD_COLUMNS}
             FROM meal_detail md
             JOIN food f ON f.food_id = md.food_id
             WHERE md.track_id = ?1
             ORDER BY md.link_id"
          ))?;
          stmt
            .query_map(rusqlite::params![daily.track_id], |row| {
              Ok(RawMealEntry {
                link_id:   row.get(0)?,
                logged_at: row.get(1)?,
                food:      food_from_row(row, 2)?,
              })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        tx.commit()?;

        Ok(Some((daily, entries)))
      })
      .await?;

    let Some((daily, entries)) = raw else { return Ok(None) };

    let meals = DailyMeals {
      daily: daily.into_daily_meal()?,
      meals: entries
        .into_iter()
        .map(RawMealEntry::into_entry)
        .collect::<Result<_>>()?,
    };

    let computed = meals.linked_calories();
    if computed != meals.daily.total_calories {
      tracing::error!(
        track_id = %meals.daily.track_id,
        stored = meals.daily.total_calories,
        computed,
        "daily total out of sync with linked foods"
      );
      return Err(Error::InvariantViolation {
        track_id: meals.daily.track_id.to_string(),
        stored:   meals.daily.total_calories,
        computed,
      });
    }

    Ok(Some(meals))
  }

  async fn calories_between(
    &self,
    user_id: String,
    from:    NaiveDate,
    to:      NaiveDate,
  ) -> Result<i64> {
    let (from_str, to_str) = (encode_date(from), encode_date(to));
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(conn.query_row(
            "SELECT COALESCE(SUM(total_calories), 0)
             FROM daily_meal
             WHERE user_id = ?1 AND meal_date BETWEEN ?2 AND ?3",
            rusqlite::params![user_id, from_str, to_str],
            |r| r.get(0),
          )?)
        })
        .await?,
    )
  }

  // ── Diet plans ────────────────────────────────────────────────────────────

  async fn create_diet_plan(&self, input: NewDietPlan) -> Result<DietPlan> {
    input.validate()?;
    let plan = input.into_plan(Uuid::new_v4().to_string());

    let row       = plan.clone();
    let start_str = encode_date(plan.start_date);
    let end_str   = encode_date(plan.end_date);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO diet_plan (plan_id, user_id, start_date, end_date, calorie_goal)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![row.plan_id, row.user_id, start_str, end_str, row.calorie_goal],
        )?;
        Ok(())
      })
      .await?;

    Ok(plan)
  }

  async fn current_calorie_goal(&self, user_id: String) -> Result<Option<i64>> {
    let raw: Option<RawDietPlan> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT plan_id, user_id, start_date, end_date, calorie_goal
             FROM diet_plan
             WHERE user_id = ?1
             ORDER BY end_date DESC, start_date DESC
             LIMIT 1",
            rusqlite::params![user_id],
            |row| {
              Ok(RawDietPlan {
                plan_id:      row.get(0)?,
                user_id:      row.get(1)?,
                start_date:   row.get(2)?,
                end_date:     row.get(3)?,
                calorie_goal: row.get(4)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    Ok(raw.map(RawDietPlan::into_plan).transpose()?.map(|p| p.calorie_goal))
  }

  // ── Calorie profiles ──────────────────────────────────────────────────────

  async fn save_calorie_profile(&self, input: NewCalorieProfile) -> Result<CalorieProfile> {
    validate_user_id(&input.user_id)?;

    let recorded_at  = Utc::now();
    let row          = input.clone();
    let activity_str = encode_activity(input.activity);
    let at_str       = encode_dt(recorded_at);

    let profile_id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users_calorie (
             user_id, age, height, weight, activity, calories, recorded_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            row.user_id,
            row.age,
            row.height,
            row.weight,
            activity_str,
            row.calories,
            at_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(CalorieProfile {
      profile_id,
      user_id: input.user_id,
      age: input.age,
      height: input.height,
      weight: input.weight,
      activity: input.activity,
      calories: input.calories,
      recorded_at,
    })
  }

  async fn list_calorie_profiles(&self, user_id: String) -> Result<Vec<CalorieProfile>> {
    let raws: Vec<RawCalorieProfile> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT profile_id, user_id, age, height, weight, activity, calories, recorded_at
           FROM users_calorie
           WHERE user_id = ?1
           ORDER BY profile_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_id], |row| {
            Ok(RawCalorieProfile {
              profile_id:  row.get(0)?,
              user_id:     row.get(1)?,
              age:         row.get(2)?,
              height:      row.get(3)?,
              weight:      row.get(4)?,
              activity:    row.get(5)?,
              calories:    row.get(6)?,
              recorded_at: row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCalorieProfile::into_profile).collect()
  }
}
