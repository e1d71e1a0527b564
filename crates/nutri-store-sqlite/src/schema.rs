//! SQL schema for the nutrishe SQLite store.
//!
//! Executed at connection startup when `PRAGMA user_version` is behind
//! [`SCHEMA_VERSION`].

pub const SCHEMA_VERSION: i64 = 1;

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    username      TEXT NOT NULL UNIQUE,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,     -- argon2 PHC string
    birthdate     TEXT NOT NULL,     -- YYYY-MM-DD
    height        REAL NOT NULL,
    weight        REAL NOT NULL,
    created_at    TEXT NOT NULL      -- RFC 3339 UTC
);

CREATE TABLE IF NOT EXISTS food (
    food_id       TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    serving       INTEGER NOT NULL DEFAULT 0,
    calories      INTEGER NOT NULL CHECK (calories >= 0),
    fat           REAL NOT NULL DEFAULT 0,
    carbohydrates REAL NOT NULL DEFAULT 0,
    protein       REAL NOT NULL DEFAULT 0,
    fiber         REAL,
    calcium       INTEGER,
    category      TEXT NOT NULL DEFAULT 'food'
);

-- One aggregate per (user, date). total_calories is derived from
-- meal_detail and rewritten by every transaction that touches the links.
-- user_id is not a foreign key; callers pass trusted ids.
CREATE TABLE IF NOT EXISTS daily_meal (
    track_id       TEXT PRIMARY KEY,   -- TR001, TR002, ...
    user_id        TEXT NOT NULL,
    meal_date      TEXT NOT NULL,      -- YYYY-MM-DD
    total_calories INTEGER NOT NULL DEFAULT 0,
    UNIQUE (user_id, meal_date)
);

CREATE TABLE IF NOT EXISTS meal_detail (
    link_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    track_id  TEXT NOT NULL REFERENCES daily_meal(track_id),
    food_id   TEXT NOT NULL REFERENCES food(food_id),
    logged_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS diet_plan (
    plan_id      TEXT PRIMARY KEY,
    user_id      TEXT NOT NULL,
    start_date   TEXT NOT NULL,
    end_date     TEXT NOT NULL,
    calorie_goal INTEGER NOT NULL CHECK (calorie_goal > 0)
);

CREATE TABLE IF NOT EXISTS users_calorie (
    profile_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     TEXT NOT NULL,
    age         INTEGER NOT NULL,
    height      REAL NOT NULL,
    weight      REAL NOT NULL,
    activity    TEXT NOT NULL,   -- sedentary | light | moderate | active | very active
    calories    REAL NOT NULL,
    recorded_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS meal_detail_track_idx   ON meal_detail(track_id);
CREATE INDEX IF NOT EXISTS daily_meal_user_date_idx ON daily_meal(user_id, meal_date);
CREATE INDEX IF NOT EXISTS diet_plan_user_idx      ON diet_plan(user_id, end_date);
CREATE INDEX IF NOT EXISTS users_calorie_user_idx  ON users_calorie(user_id);

PRAGMA user_version = 1;
";
