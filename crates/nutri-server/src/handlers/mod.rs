//! Handlers served by the binary itself rather than by `nutri-api`.

pub mod articles;
pub mod auth;
pub mod recommend;

/// `GET /health`
pub async fn health() -> &'static str { "OK" }
