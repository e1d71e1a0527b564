//! Minimal client for the Gemini `generateContent` REST endpoint.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// The prompt sent for a meal-plan recommendation.
pub fn meal_plan_prompt(days: &str, calories: &str, cuisine: &str) -> String {
  format!(
    "Generate a meal plan for {days} days, {calories} calories each day, with \
     calories for each meal. Specific to {cuisine} cuisines."
  )
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct Part {
  #[serde(default)]
  pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
  #[serde(default)]
  pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
  contents: [RequestContent<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
  parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
  text: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
  pub content: Option<Content>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
  #[serde(default)]
  pub candidates: Vec<Candidate>,
}

impl GenerateResponse {
  /// The first text part of the last candidate that has content.
  pub fn text(&self) -> Option<&str> {
    self
      .candidates
      .iter()
      .rev()
      .filter_map(|c| c.content.as_ref())
      .find_map(|c| c.parts.first())
      .map(|p| p.text.as_str())
      .filter(|t| !t.is_empty())
  }
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct GenAiClient {
  http:     Client,
  base_url: String,
  model:    String,
  api_key:  Option<String>,
}

impl GenAiClient {
  pub fn new(
    base_url: impl Into<String>,
    model:    impl Into<String>,
    api_key:  Option<String>,
    timeout:  Duration,
  ) -> Result<Self> {
    let http = Client::builder().timeout(timeout).build()?;
    Ok(Self {
      http,
      base_url: base_url.into(),
      model: model.into(),
      api_key: api_key.filter(|k| !k.is_empty()),
    })
  }

  /// Send `prompt` and return the generated text.
  pub async fn generate(&self, prompt: &str) -> Result<String> {
    let key = self.api_key.as_deref().ok_or(Error::NotConfigured("genai_api_key"))?;
    let url = format!(
      "{}/models/{}:generateContent",
      self.base_url.trim_end_matches('/'),
      self.model
    );

    let body = GenerateRequest {
      contents: [RequestContent { parts: [RequestPart { text: prompt }] }],
    };

    let resp = self
      .http
      .post(&url)
      .header("x-goog-api-key", key)
      .json(&body)
      .send()
      .await?;

    if !resp.status().is_success() {
      tracing::warn!(status = %resp.status(), model = %self.model, "generateContent failed");
      return Err(Error::UpstreamStatus { status: resp.status().as_u16() });
    }

    let parsed: GenerateResponse = resp.json().await?;
    parsed.text().map(str::to_owned).ok_or(Error::EmptyResponse)
  }
}
