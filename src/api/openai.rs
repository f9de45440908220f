use crate::api::body_snippet;
use crate::config::Config;
use crate::form::{Genre, MovieFormData};
use crate::{logi, logw};
use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

const CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const MAX_TITLE_CHARS: usize = 200;

pub fn default_plot(genre: &Genre) -> String {
    format!(
        "A thrilling {} adventure that will keep you on the edge of your seat!",
        genre
    )
}

fn trim_chars(input: &str, max_chars: usize) -> String {
    input.chars().take(max_chars).collect()
}

fn openai_extract_message_text(resp_json: &str) -> Option<String> {
    let root: serde_json::Value = serde_json::from_str(resp_json).ok()?;

    if let Some(err) = root.get("error") {
        if let Some(msg) = err.get("message").and_then(|v| v.as_str()) {
            logw(format!("OpenAI error message: {}", msg));
        }
        if let Some(typ) = err.get("type").and_then(|v| v.as_str()) {
            logw(format!("OpenAI error type: {}", typ));
        }
        if let Some(code) = err.get("code").and_then(|v| v.as_str()) {
            logw(format!("OpenAI error code: {}", code));
        }
        return None;
    }

    let text = root
        .get("choices")?
        .as_array()?
        .first()?
        .get("message")?
        .get("content")?
        .as_str()?
        .trim();

    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Short plot blurbs for a poster's movie.
pub struct PlotWriter {
    client: Client,
    api_key: Option<String>,
    timeout: Duration,
}

impl PlotWriter {
    pub fn new(client: Client, api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            client,
            api_key,
            timeout,
        }
    }

    pub fn from_config(client: Client, cfg: &Config) -> Self {
        Self::new(client, cfg.openai_api_key.clone(), cfg.generation_timeout())
    }

    /// Never fails; any problem yields the generic genre blurb.
    pub async fn generate_plot_summary(&self, form: &MovieFormData) -> String {
        match self.request_plot(form).await {
            Ok(Some(plot)) => {
                logi(format!("OpenAI plot received: {} chars", plot.len()));
                plot
            }
            Ok(None) => default_plot(form.genre()),
            Err(err) => {
                logw(format!("Error generating plot: {:#}", err));
                default_plot(form.genre())
            }
        }
    }

    async fn request_plot(&self, form: &MovieFormData) -> Result<Option<String>> {
        let Some(api_key) = self.api_key.as_deref() else {
            logw("OpenAI API key not found");
            return Ok(None);
        };

        let prompt = format!(
            "Write a compelling movie plot summary for a {} movie titled \"{}\". Keep it under 150 words and make it exciting!",
            form.genre(),
            trim_chars(form.title(), MAX_TITLE_CHARS)
        );

        let body = json!({
            "model": "gpt-3.5-turbo",
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": 200,
        });

        let resp = self
            .client
            .post(CHAT_URL)
            .bearer_auth(api_key)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .context("OpenAI request failed")?;

        let status = resp.status();
        let raw = resp.text().await.unwrap_or_default();

        if !status.is_success() {
            logw(format!("OpenAI HTTP {}", status.as_u16()));
            if !raw.is_empty() {
                logw(format!("OpenAI raw body: {}", body_snippet(&raw)));
            }
            return Ok(None);
        }

        let text = openai_extract_message_text(&raw);
        if text.is_none() {
            logw("OpenAI response parse failed.");
        }
        Ok(text)
    }
}
