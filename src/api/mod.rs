pub mod huggingface;
pub mod openai;
pub mod stock;
pub mod tmdb;
pub mod unsplash;

use anyhow::{Context, Result};
use std::time::Duration;

const USER_AGENT: &str = concat!("ai-movie-posters/", env!("CARGO_PKG_VERSION"));

/// Shared client for every adapter. Per-call deadlines are enforced by the
/// caller; this only bounds connection setup.
pub fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(30))
        .build()
        .context("failed to build reqwest client")
}

pub(crate) fn body_snippet(raw: &str) -> String {
    raw.chars().take(800).collect::<String>()
}
