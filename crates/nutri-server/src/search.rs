//! Client for the Google Custom Search JSON API, used for article lookup.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// Results requested per search.
pub const MAX_RESULTS: u8 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
  pub title:   String,
  pub link:    String,
  #[serde(default)]
  pub snippet: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
  #[serde(default)]
  items: Vec<Article>,
}

/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct SearchClient {
  http:     Client,
  base_url: String,
  api_key:  Option<String>,
  cx:       Option<String>,
}

impl SearchClient {
  pub fn new(
    base_url: impl Into<String>,
    api_key:  Option<String>,
    cx:       Option<String>,
    timeout:  Duration,
  ) -> Result<Self> {
    let http = Client::builder().timeout(timeout).build()?;
    Ok(Self {
      http,
      base_url: base_url.into(),
      api_key: api_key.filter(|k| !k.is_empty()),
      cx: cx.filter(|c| !c.is_empty()),
    })
  }

  pub async fn search(&self, query: &str) -> Result<Vec<Article>> {
    let key = self.api_key.as_deref().ok_or(Error::NotConfigured("search_api_key"))?;
    let cx = self.cx.as_deref().ok_or(Error::NotConfigured("search_cx"))?;
    let num = MAX_RESULTS.to_string();

    let resp = self
      .http
      .get(&self.base_url)
      .query(&[
        ("key", key),
        ("cx", cx),
        ("q", query),
        ("num", num.as_str()),
      ])
      .send()
      .await?;

    if !resp.status().is_success() {
      tracing::warn!(status = %resp.status(), "custom search failed");
      return Err(Error::UpstreamStatus { status: resp.status().as_u16() });
    }

    let parsed: SearchResponse = resp.json().await?;
    tracing::debug!(results = parsed.items.len(), "custom search returned");
    Ok(parsed.items)
  }
}
