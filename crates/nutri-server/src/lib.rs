//! HTTP server for nutrishe.
//!
//! Mounts the [`nutri_api`] router under `/api` behind bearer-token
//! authentication, and adds registration, login, the AI and search proxies,
//! and a health check.

pub mod auth;
pub mod error;
pub mod genai;
pub mod handlers;
pub mod search;

pub use error::Error;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
  Router,
  http::StatusCode,
  middleware,
  routing::{get, post},
};
use nutri_core::store::NutritionStore;
use serde::Deserialize;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use auth::JwtKeys;
use genai::GenAiClient;
use search::SearchClient;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `NUTRI_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                 String,
  #[serde(default = "default_port")]
  pub port:                 u16,
  #[serde(default = "default_store_path")]
  pub store_path:           PathBuf,
  #[serde(default = "default_busy_timeout_ms")]
  pub busy_timeout_ms:      u64,
  #[serde(default = "default_request_timeout_secs")]
  pub request_timeout_secs: u64,
  pub jwt_secret:           String,
  #[serde(default = "default_token_ttl_secs")]
  pub token_ttl_secs:       i64,
  #[serde(default)]
  pub genai_api_key:        Option<String>,
  #[serde(default = "default_genai_model")]
  pub genai_model:          String,
  #[serde(default = "default_genai_base_url")]
  pub genai_base_url:       String,
  #[serde(default)]
  pub search_api_key:       Option<String>,
  #[serde(default)]
  pub search_cx:            Option<String>,
  #[serde(default = "default_search_base_url")]
  pub search_base_url:      String,
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8081 }
fn default_store_path() -> PathBuf { PathBuf::from("nutrishe.db") }
fn default_busy_timeout_ms() -> u64 { 5000 }
fn default_request_timeout_secs() -> u64 { 30 }
fn default_token_ttl_secs() -> i64 { 24 * 60 * 60 }
fn default_genai_model() -> String { genai::DEFAULT_MODEL.into() }
fn default_genai_base_url() -> String { genai::DEFAULT_BASE_URL.into() }
fn default_search_base_url() -> String { search::DEFAULT_BASE_URL.into() }

impl ServerConfig {
  pub fn request_timeout(&self) -> Duration { Duration::from_secs(self.request_timeout_secs) }

  pub fn busy_timeout(&self) -> Duration { Duration::from_millis(self.busy_timeout_ms) }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: NutritionStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
  pub jwt:    Arc<JwtKeys>,
  pub genai:  GenAiClient,
  pub search: SearchClient,
}

impl<S: NutritionStore> AppState<S> {
  /// Build the state for `store`, wiring the token keys and provider clients
  /// from `config`.
  pub fn new(store: S, config: ServerConfig) -> Result<Self, Error> {
    let timeout = config.request_timeout();
    let jwt = JwtKeys::new(
      &config.jwt_secret,
      chrono::Duration::seconds(config.token_ttl_secs),
    );
    let genai = GenAiClient::new(
      config.genai_base_url.clone(),
      config.genai_model.clone(),
      config.genai_api_key.clone(),
      timeout,
    )?;
    let search = SearchClient::new(
      config.search_base_url.clone(),
      config.search_api_key.clone(),
      config.search_cx.clone(),
      timeout,
    )?;

    Ok(Self {
      store: Arc::new(store),
      config: Arc::new(config),
      jwt: Arc::new(jwt),
      genai,
      search,
    })
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Answers `408` once `timeout` elapses. Store work already queued on the
/// connection thread still runs to commit or rollback.
fn timeout_layer(timeout: Duration) -> TimeoutLayer {
  TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}

/// Build the full application [`Router`].
pub fn router<S>(state: AppState<S>) -> Router
where
  S: NutritionStore + Clone + 'static,
{
  let proxies = Router::new()
    .route("/recommendations", post(handlers::recommend::handler::<S>))
    .route("/articles/search", post(handlers::articles::handler::<S>))
    .with_state(state.clone());

  let api = nutri_api::api_router(state.store.clone())
    .merge(proxies)
    .layer(middleware::from_fn_with_state(state.clone(), auth::require_auth::<S>));

  Router::new()
    .route("/health",        get(handlers::health))
    .route("/auth/register", post(handlers::auth::register::<S>))
    .route("/auth/login",    post(handlers::auth::login::<S>))
    .with_state(state.clone())
    .nest("/api", api)
    .layer(timeout_layer(state.config.request_timeout()))
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────
