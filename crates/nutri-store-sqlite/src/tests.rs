//! Integration tests for `SqliteStore` against in-memory and on-disk databases.

use chrono::NaiveDate;
use nutri_core::{
  Classify, ErrorKind,
  calorie::{ActivityLevel, CalorieRequest, NewCalorieProfile, estimate},
  food::NewFood,
  meal::TrackId,
  plan::NewDietPlan,
  store::NutritionStore,
  user::NewUser,
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn day(d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(2024, 3, d).unwrap() }

/// A store seeded with F1 (100 kcal), F2 (50 kcal) and F3 (25 kcal).
async fn seeded() -> SqliteStore {
  let s = store().await;
  s.add_food_with_id("F1".into(), NewFood::new("Rice", 100)).await.unwrap();
  s.add_food_with_id("F2".into(), NewFood::new("Egg", 50)).await.unwrap();
  s.add_food_with_id("F3".into(), NewFood::new("Banana", 25)).await.unwrap();
  s
}

// ─── Meal logging ────────────────────────────────────────────────────────────

#[tokio::test]
async fn first_log_creates_daily_meal() {
  let s = seeded().await;

  let track = s.log_meal("U1".into(), day(1), "F1".into()).await.unwrap();
  assert_eq!(track.as_str(), "TR001");

  let meals = s.get_daily_meals("U1".into(), day(1)).await.unwrap().unwrap();
  assert_eq!(meals.daily.track_id, track);
  assert_eq!(meals.daily.total_calories, 100);
  assert_eq!(meals.meals.len(), 1);
  assert_eq!(meals.meals[0].food.food_id, "F1");
}

#[tokio::test]
async fn repeated_logs_accumulate_on_one_aggregate() {
  let s = seeded().await;

  let a = s.log_meal("U1".into(), day(1), "F1".into()).await.unwrap();
  let b = s.log_meal("U1".into(), day(1), "F2".into()).await.unwrap();
  let c = s.log_meal("U1".into(), day(1), "F3".into()).await.unwrap();
  assert_eq!(a, b);
  assert_eq!(b, c);

  let meals = s.get_daily_meals("U1".into(), day(1)).await.unwrap().unwrap();
  assert_eq!(meals.daily.total_calories, 175);
  assert_eq!(meals.meals.len(), 3);
  assert_eq!(s.count_rows("daily_meal").await.unwrap(), 1);
}

#[tokio::test]
async fn same_food_twice_counts_twice() {
  let s = seeded().await;
  s.log_meal("U1".into(), day(1), "F1".into()).await.unwrap();
  s.log_meal("U1".into(), day(1), "F1".into()).await.unwrap();

  let meals = s.get_daily_meals("U1".into(), day(1)).await.unwrap().unwrap();
  assert_eq!(meals.daily.total_calories, 200);
  assert_eq!(meals.meals.len(), 2);
}

#[tokio::test]
async fn unknown_food_on_new_pair_leaves_no_trace() {
  let s = seeded().await;

  let err = s.log_meal("U1".into(), day(1), "NOPE".into()).await.unwrap_err();
  assert!(matches!(err, Error::UnknownFood(ref id) if id == "NOPE"));
  assert_eq!(err.kind(), ErrorKind::Validation);

  assert!(s.get_daily_meals("U1".into(), day(1)).await.unwrap().is_none());
  assert_eq!(s.count_rows("daily_meal").await.unwrap(), 0);
  assert_eq!(s.count_rows("meal_detail").await.unwrap(), 0);

  // The failed attempt did not consume a track id.
  let track = s.log_meal("U1".into(), day(1), "F1".into()).await.unwrap();
  assert_eq!(track, TrackId::first());
}

#[tokio::test]
async fn unknown_food_on_existing_pair_keeps_total() {
  let s = seeded().await;
  s.log_meal("U1".into(), day(1), "F1".into()).await.unwrap();

  let err = s.log_meal("U1".into(), day(1), "NOPE".into()).await.unwrap_err();
  assert!(matches!(err, Error::UnknownFood(_)));

  let meals = s.get_daily_meals("U1".into(), day(1)).await.unwrap().unwrap();
  assert_eq!(meals.daily.total_calories, 100);
  assert_eq!(meals.meals.len(), 1);
}

#[tokio::test]
async fn empty_user_id_is_rejected() {
  let s = seeded().await;
  let err = s.log_meal("  ".into(), day(1), "F1".into()).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);
  assert_eq!(s.count_rows("daily_meal").await.unwrap(), 0);
}

#[tokio::test]
async fn track_ids_are_sequential_across_pairs() {
  let s = seeded().await;

  let a = s.log_meal("U1".into(), day(1), "F1".into()).await.unwrap();
  let b = s.log_meal("U1".into(), day(2), "F1".into()).await.unwrap();
  let c = s.log_meal("U2".into(), day(1), "F1".into()).await.unwrap();

  assert_eq!(a.as_str(), "TR001");
  assert_eq!(b.as_str(), "TR002");
  assert_eq!(c.as_str(), "TR003");
}

#[tokio::test]
async fn track_ids_order_numerically_past_three_digits() {
  let s = seeded().await;
  s.execute_raw(
    "INSERT INTO daily_meal (track_id, user_id, meal_date, total_calories)
     VALUES ('TR999', 'U0', '2000-01-01', 0)",
  )
  .await
  .unwrap();

  let a = s.log_meal("U1".into(), day(1), "F1".into()).await.unwrap();
  assert_eq!(a.as_str(), "TR1000");

  // Lexically "TR999" > "TR1000"; the next id must still be TR1001.
  let b = s.log_meal("U1".into(), day(2), "F1".into()).await.unwrap();
  assert_eq!(b.as_str(), "TR1001");
}

#[tokio::test]
async fn recompute_is_idempotent() {
  let s = seeded().await;
  let track = s.log_meal("U1".into(), day(1), "F1".into()).await.unwrap();
  s.log_meal("U1".into(), day(1), "F2".into()).await.unwrap();
  s.log_meal("U1".into(), day(1), "F3".into()).await.unwrap();

  assert_eq!(s.recompute_daily_total(&track).await.unwrap(), 175);
  assert_eq!(s.recompute_daily_total(&track).await.unwrap(), 175);

  let meals = s.get_daily_meals("U1".into(), day(1)).await.unwrap().unwrap();
  assert_eq!(meals.daily.total_calories, 175);
}

#[tokio::test]
async fn recompute_repairs_a_drifted_total() {
  let s = seeded().await;
  let track = s.log_meal("U1".into(), day(1), "F1".into()).await.unwrap();
  s.execute_raw("UPDATE daily_meal SET total_calories = 9999").await.unwrap();

  let err = s.get_daily_meals("U1".into(), day(1)).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::InvariantViolation);
  assert!(matches!(
    err,
    Error::InvariantViolation { stored: 9999, computed: 100, .. }
  ));

  assert_eq!(s.recompute_daily_total(&track).await.unwrap(), 100);
  assert!(s.get_daily_meals("U1".into(), day(1)).await.is_ok());
}

#[tokio::test]
async fn recompute_of_unknown_track_id_is_not_found() {
  let s = seeded().await;
  s.log_meal("U1".into(), day(1), "F1".into()).await.unwrap();

  let err = s.recompute_daily_total(&TrackId::from_seq(77)).await.unwrap_err();
  assert!(matches!(&err, Error::DailyMealNotFound(id) if id == "TR077"));
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn removing_an_entry_recomputes_total() {
  let s = seeded().await;
  s.log_meal("U1".into(), day(1), "F1".into()).await.unwrap();
  s.log_meal("U1".into(), day(1), "F2".into()).await.unwrap();

  let meals = s.get_daily_meals("U1".into(), day(1)).await.unwrap().unwrap();
  let rice = meals.meals.iter().find(|m| m.food.food_id == "F1").unwrap();

  let daily = s.remove_meal("U1".into(), rice.link_id).await.unwrap();
  assert_eq!(daily.total_calories, 50);

  let meals = s.get_daily_meals("U1".into(), day(1)).await.unwrap().unwrap();
  assert_eq!(meals.meals.len(), 1);
  assert_eq!(meals.daily.total_calories, 50);
}

#[tokio::test]
async fn removing_last_entry_keeps_empty_aggregate() {
  let s = seeded().await;
  s.log_meal("U1".into(), day(1), "F1".into()).await.unwrap();
  let meals = s.get_daily_meals("U1".into(), day(1)).await.unwrap().unwrap();

  let daily = s.remove_meal("U1".into(), meals.meals[0].link_id).await.unwrap();
  assert_eq!(daily.total_calories, 0);

  let meals = s.get_daily_meals("U1".into(), day(1)).await.unwrap().unwrap();
  assert!(meals.meals.is_empty());
}

#[tokio::test]
async fn removing_unknown_entry_is_not_found() {
  let s = seeded().await;
  let err = s.remove_meal("U1".into(), 42).await.unwrap_err();
  assert!(matches!(err, Error::MealEntryNotFound(42)));
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn removing_another_users_entry_is_not_found() {
  let s = seeded().await;
  s.log_meal("U1".into(), day(1), "F1".into()).await.unwrap();
  let meals = s.get_daily_meals("U1".into(), day(1)).await.unwrap().unwrap();
  let link_id = meals.meals[0].link_id;

  let err = s.remove_meal("U2".into(), link_id).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);

  let meals = s.get_daily_meals("U1".into(), day(1)).await.unwrap().unwrap();
  assert_eq!(meals.daily.total_calories, 100);
}

#[tokio::test]
async fn daily_meals_for_empty_day_is_none() {
  let s = seeded().await;
  s.log_meal("U1".into(), day(1), "F1".into()).await.unwrap();
  assert!(s.get_daily_meals("U1".into(), day(2)).await.unwrap().is_none());
  assert!(s.get_daily_meals("U2".into(), day(1)).await.unwrap().is_none());
}

#[tokio::test]
async fn calories_between_sums_the_range() {
  let s = seeded().await;
  s.log_meal("U1".into(), day(1), "F1".into()).await.unwrap();
  s.log_meal("U1".into(), day(15), "F2".into()).await.unwrap();
  s.log_meal("U1".into(), day(31), "F1".into()).await.unwrap();
  s.log_meal("U2".into(), day(1), "F1".into()).await.unwrap();

  let (first, last) = nutri_core::meal::parse_month("2024-03").unwrap();
  assert_eq!(s.calories_between("U1".into(), first, last).await.unwrap(), 250);
  assert_eq!(s.calories_between("U1".into(), day(2), day(30)).await.unwrap(), 50);
  assert_eq!(s.calories_between("U3".into(), first, last).await.unwrap(), 0);
}

// ─── Concurrency ─────────────────────────────────────────────────────────────

fn temp_db_path() -> std::path::PathBuf {
  std::env::temp_dir().join(format!("nutri-test-{}.db", uuid::Uuid::new_v4()))
}

#[tokio::test]
async fn concurrent_first_logs_share_one_aggregate() {
  let path = temp_db_path();

  let a = SqliteStore::open(&path).await.unwrap();
  a.add_food_with_id("F1".into(), NewFood::new("Rice", 100)).await.unwrap();
  a.add_food_with_id("F2".into(), NewFood::new("Egg", 75)).await.unwrap();
  // A second, independent connection to the same file.
  let b = SqliteStore::open(&path).await.unwrap();

  let mut tasks = Vec::new();
  for i in 0..8 {
    let store = if i % 2 == 0 { a.clone() } else { b.clone() };
    let food = if i % 2 == 0 { "F1" } else { "F2" };
    tasks.push(tokio::spawn(async move {
      store.log_meal("U1".into(), day(1), food.into()).await
    }));
  }

  let mut ids = Vec::new();
  for task in tasks {
    ids.push(task.await.unwrap().unwrap());
  }
  assert!(ids.iter().all(|id| *id == ids[0]));

  assert_eq!(a.count_rows("daily_meal").await.unwrap(), 1);
  let meals = b.get_daily_meals("U1".into(), day(1)).await.unwrap().unwrap();
  assert_eq!(meals.meals.len(), 8);
  assert_eq!(meals.daily.total_calories, 4 * 100 + 4 * 75);

  drop((a, b));
  let _ = std::fs::remove_file(&path);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn reads_during_concurrent_logs_see_consistent_totals() {
  let path = temp_db_path();
  let writer = SqliteStore::open(&path).await.unwrap();
  writer.add_food_with_id("F1".into(), NewFood::new("Rice", 100)).await.unwrap();
  writer.log_meal("U1".into(), day(1), "F1".into()).await.unwrap();
  let reader = SqliteStore::open(&path).await.unwrap();

  const LOGS: usize = 300;
  let logging = tokio::spawn(async move {
    for _ in 0..LOGS {
      writer.log_meal("U1".into(), day(1), "F1".into()).await.unwrap();
    }
  });

  let mut reads = 0;
  while !logging.is_finished() {
    let meals = reader
      .get_daily_meals("U1".into(), day(1))
      .await
      .unwrap_or_else(|e| panic!("read {reads} failed: {e}"))
      .unwrap();
    assert_eq!(meals.daily.total_calories, meals.linked_calories());
    reads += 1;
  }
  logging.await.unwrap();

  let meals = reader.get_daily_meals("U1".into(), day(1)).await.unwrap().unwrap();
  assert_eq!(meals.meals.len(), LOGS + 1);
  assert_eq!(meals.daily.total_calories, 100 * (LOGS as i64 + 1));

  drop(reader);
  let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn concurrent_new_pairs_get_distinct_track_ids() {
  let path = temp_db_path();
  let a = SqliteStore::open(&path).await.unwrap();
  a.add_food_with_id("F1".into(), NewFood::new("Rice", 100)).await.unwrap();
  let b = SqliteStore::open(&path).await.unwrap();

  let mut tasks = Vec::new();
  for d in 1..=6 {
    let store = if d % 2 == 0 { a.clone() } else { b.clone() };
    tasks.push(tokio::spawn(async move {
      store.log_meal("U1".into(), day(d), "F1".into()).await
    }));
  }

  let mut seqs = Vec::new();
  for task in tasks {
    seqs.push(task.await.unwrap().unwrap().seq());
  }
  seqs.sort_unstable();
  assert_eq!(seqs, vec![1, 2, 3, 4, 5, 6]);

  drop((a, b));
  let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn reopening_keeps_data() {
  let path = temp_db_path();
  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.add_food_with_id("F1".into(), NewFood::new("Rice", 100)).await.unwrap();
    s.log_meal("U1".into(), day(1), "F1".into()).await.unwrap();
  }

  let s = SqliteStore::open(&path).await.unwrap();
  let meals = s.get_daily_meals("U1".into(), day(1)).await.unwrap().unwrap();
  assert_eq!(meals.daily.total_calories, 100);
  assert_eq!(
    s.log_meal("U1".into(), day(2), "F1".into()).await.unwrap().as_str(),
    "TR002"
  );

  drop(s);
  let _ = std::fs::remove_file(&path);
}

// ─── Food catalog ────────────────────────────────────────────────────────────

#[tokio::test]
async fn foods_round_trip_and_list_by_category() {
  let s = store().await;

  let mut apple = NewFood::new("Apple", 52);
  apple.category = "fruit".into();
  apple.fiber = Some(2.4);
  let apple = s.add_food(apple).await.unwrap();
  s.add_food(NewFood::new("Bread", 265)).await.unwrap();

  let fetched = s.get_food(apple.food_id.clone()).await.unwrap().unwrap();
  assert_eq!(fetched, apple);

  let names: Vec<_> = s
    .list_foods()
    .await
    .unwrap()
    .into_iter()
    .map(|f| (f.category, f.name))
    .collect();
  assert_eq!(
    names,
    vec![("food".into(), "Bread".into()), ("fruit".into(), "Apple".into())]
  );
}

#[tokio::test]
async fn duplicate_food_id_is_conflict() {
  let s = seeded().await;
  let err = s
    .add_food_with_id("F1".into(), NewFood::new("Other", 1))
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn invalid_food_is_rejected() {
  let s = store().await;
  let err = s.add_food(NewFood::new("Ghost", -5)).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);
  assert_eq!(s.count_rows("food").await.unwrap(), 0);
}

// ─── Users ───────────────────────────────────────────────────────────────────

fn new_user(username: &str, email: &str) -> NewUser {
  NewUser {
    name:          "Ada".into(),
    username:      username.into(),
    email:         email.into(),
    password_hash: "$argon2id$stub".into(),
    birthdate:     NaiveDate::from_ymd_opt(1994, 5, 17).unwrap(),
    height:        165.0,
    weight:        60.0,
  }
}

#[tokio::test]
async fn users_round_trip() {
  let s = store().await;
  let user = s.create_user(new_user("ada", "ada@example.com")).await.unwrap();

  let fetched = s.get_user(user.user_id.clone()).await.unwrap().unwrap();
  assert_eq!(fetched.username, "ada");
  assert_eq!(fetched.birthdate, user.birthdate);

  let creds = s.find_credentials("ada@example.com".into()).await.unwrap().unwrap();
  assert_eq!(creds.user.user_id, user.user_id);
  assert_eq!(creds.password_hash, "$argon2id$stub");

  assert!(s.find_credentials("nobody@example.com".into()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_username_or_email_is_conflict() {
  let s = store().await;
  s.create_user(new_user("ada", "ada@example.com")).await.unwrap();

  let err = s.create_user(new_user("ada", "other@example.com")).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Conflict);

  let err = s.create_user(new_user("other", "ada@example.com")).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Conflict);

  assert_eq!(s.count_rows("users").await.unwrap(), 1);
}

// ─── Diet plans ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn current_goal_follows_latest_end_date() {
  let s = store().await;
  assert!(s.current_calorie_goal("U1".into()).await.unwrap().is_none());

  let plan = s
    .create_diet_plan(NewDietPlan {
      user_id:      "U1".into(),
      calorie_goal: 1800,
      start_date:   day(10),
    })
    .await
    .unwrap();
  assert_eq!(plan.end_date, NaiveDate::from_ymd_opt(2024, 4, 10).unwrap());

  s.create_diet_plan(NewDietPlan {
    user_id:      "U1".into(),
    calorie_goal: 2000,
    start_date:   day(1),
  })
  .await
  .unwrap();

  assert_eq!(s.current_calorie_goal("U1".into()).await.unwrap(), Some(1800));
  assert!(s.current_calorie_goal("U2".into()).await.unwrap().is_none());
}

// ─── Calorie profiles ────────────────────────────────────────────────────────

#[tokio::test]
async fn calorie_profiles_are_listed_oldest_first() {
  let s = store().await;

  for activity in ["sedentary", "very active"] {
    let req = CalorieRequest {
      age:      30,
      height:   165.0,
      weight:   60.0,
      activity: activity.into(),
    };
    let est = estimate(&req).unwrap();
    s.save_calorie_profile(NewCalorieProfile::from_estimate("U1".into(), &req, &est))
      .await
      .unwrap();
  }

  let profiles = s.list_calorie_profiles("U1".into()).await.unwrap();
  assert_eq!(profiles.len(), 2);
  assert_eq!(profiles[0].activity, ActivityLevel::Sedentary);
  assert_eq!(profiles[1].activity, ActivityLevel::VeryActive);
  assert!(profiles[0].profile_id < profiles[1].profile_id);
  assert!(s.list_calorie_profiles("U2".into()).await.unwrap().is_empty());
}
