use crate::config::Config;
use crate::form::Genre;
use crate::{logi, logw};
use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DISCOVER_URL: &str = "https://api.themoviedb.org/3/discover/movie";
const POSTER_BASE: &str = "https://image.tmdb.org/t/p/w500";
const MAX_SUGGESTIONS: usize = 5;

/// TMDB genre id; drama for anything unrecognised.
pub fn genre_id(genre: &Genre) -> u32 {
    match genre {
        Genre::Action => 28,
        Genre::Comedy => 35,
        Genre::Drama => 18,
        Genre::Horror => 27,
        Genre::Romance => 10749,
        Genre::SciFi => 878,
        Genre::Thriller => 53,
        Genre::Fantasy => 14,
        Genre::Other(_) => 18,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovieSuggestion {
    pub title: String,
    pub overview: String,
    pub poster: Option<String>,
    pub release_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DiscoverResponse {
    #[serde(default)]
    results: Vec<DiscoverMovie>,
}

#[derive(Debug, Deserialize)]
struct DiscoverMovie {
    #[serde(default)]
    title: String,
    #[serde(default)]
    overview: String,
    poster_path: Option<String>,
    release_date: Option<String>,
}

impl From<DiscoverMovie> for MovieSuggestion {
    fn from(movie: DiscoverMovie) -> Self {
        Self {
            title: movie.title,
            overview: movie.overview,
            poster: movie
                .poster_path
                .filter(|p| !p.is_empty())
                .map(|p| format!("{}{}", POSTER_BASE, p)),
            release_date: movie.release_date.filter(|d| !d.is_empty()),
        }
    }
}

fn parse_discover(raw: &str) -> Result<Vec<MovieSuggestion>> {
    let parsed: DiscoverResponse =
        serde_json::from_str(raw).context("Failed to parse TMDB discover JSON")?;
    Ok(parsed
        .results
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(MovieSuggestion::from)
        .collect())
}

/// Popular movies of a genre, for inspiration next to the poster form.
pub struct MovieSuggestions {
    client: Client,
    api_key: Option<String>,
    timeout: Duration,
}

impl MovieSuggestions {
    pub fn new(client: Client, api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            client,
            api_key,
            timeout,
        }
    }

    pub fn from_config(client: Client, cfg: &Config) -> Self {
        Self::new(client, cfg.tmdb_api_key.clone(), cfg.search_timeout())
    }

    /// Empty on any failure.
    pub async fn movie_suggestions(&self, genre: &Genre) -> Vec<MovieSuggestion> {
        match self.discover(genre).await {
            Ok(found) => {
                logi(format!("TMDB suggestions for {}: {}", genre, found.len()));
                found
            }
            Err(err) => {
                logw(format!("Error fetching movie suggestions: {:#}", err));
                Vec::new()
            }
        }
    }

    async fn discover(&self, genre: &Genre) -> Result<Vec<MovieSuggestion>> {
        let Some(api_key) = self.api_key.as_deref() else {
            anyhow::bail!("TMDB API key not found");
        };

        let genre_id = genre_id(genre).to_string();
        let resp = self
            .client
            .get(DISCOVER_URL)
            .query(&[
                ("api_key", api_key),
                ("with_genres", genre_id.as_str()),
                ("sort_by", "popularity.desc"),
                ("page", "1"),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .context("TMDB request failed")?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("TMDB HTTP {}", status.as_u16());
        }

        let raw = resp.text().await.context("TMDB response read failed")?;
        parse_discover(&raw)
    }
}
