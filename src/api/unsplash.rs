use crate::api::body_snippet;
use crate::config::Config;
use crate::error::PosterError;
use crate::generator::ImageSearch;
use crate::logw;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

const SERVICE: &str = "Unsplash";
const SEARCH_URL: &str = "https://api.unsplash.com/search/photos";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    urls: PhotoUrls,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    regular: String,
}

/// Portrait photo search, used as the first fallback for failed generations.
pub struct UnsplashSearch {
    client: Client,
    access_key: Option<String>,
}

impl UnsplashSearch {
    pub fn new(client: Client, access_key: Option<String>) -> Self {
        Self { client, access_key }
    }

    pub fn from_config(client: Client, cfg: &Config) -> Self {
        Self::new(client, cfg.unsplash_access_key.clone())
    }
}

#[async_trait]
impl ImageSearch for UnsplashSearch {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn search(&self, keywords: &str) -> Result<Option<String>, PosterError> {
        let access_key = self
            .access_key
            .as_deref()
            .ok_or(PosterError::MissingCredential(SERVICE))?;

        let resp = self
            .client
            .get(SEARCH_URL)
            .query(&[
                ("query", keywords),
                ("orientation", "portrait"),
                ("per_page", "1"),
            ])
            .header("Authorization", format!("Client-ID {}", access_key))
            .send()
            .await?;

        let status = resp.status();
        let raw = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            if !raw.is_empty() {
                logw(format!("{} raw body: {}", SERVICE, body_snippet(&raw)));
            }
            return Err(PosterError::Status {
                service: SERVICE,
                status: status.as_u16(),
            });
        }

        first_regular_url(&raw)
    }
}

fn first_regular_url(raw: &str) -> Result<Option<String>, PosterError> {
    let parsed: SearchResponse = serde_json::from_str(raw)?;
    Ok(parsed
        .results
        .into_iter()
        .map(|photo| photo.urls.regular)
        .find(|url| !url.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_first_regular_url() {
        let raw = r#"{"total":2,"results":[
            {"id":"a","urls":{"raw":"r1","regular":"https://images.unsplash.com/a?w=1080"}},
            {"id":"b","urls":{"raw":"r2","regular":"https://images.unsplash.com/b?w=1080"}}
        ]}"#;
        assert_eq!(
            first_regular_url(raw).unwrap().as_deref(),
            Some("https://images.unsplash.com/a?w=1080")
        );
    }

    #[test]
    fn empty_results_are_a_miss() {
        assert_eq!(first_regular_url(r#"{"total":0,"results":[]}"#).unwrap(), None);
        assert_eq!(first_regular_url("{}").unwrap(), None);
    }

    #[test]
    fn malformed_body_is_an_error() {
        assert!(matches!(first_regular_url("<html>"), Err(PosterError::Json(_))));
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let search = UnsplashSearch::new(Client::new(), None);
        let err = search.search("deep space").await.unwrap_err();
        assert!(matches!(err, PosterError::MissingCredential(SERVICE)));
    }
}
