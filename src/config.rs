use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub huggingface_api_key: Option<String>,
    #[serde(default)]
    pub unsplash_access_key: Option<String>,
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub tmdb_api_key: Option<String>,
    #[serde(default = "default_model_url")]
    pub huggingface_model_url: String,
    #[serde(default = "default_generation_timeout_secs")]
    pub generation_timeout_secs: u64,
    #[serde(default = "default_search_timeout_secs")]
    pub search_timeout_secs: u64,
    #[serde(default = "default_gallery_path")]
    pub gallery_path: PathBuf,
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
}

fn default_model_url() -> String {
    "https://api-inference.huggingface.co/models/runwayml/stable-diffusion-v1-5".to_string()
}

fn default_generation_timeout_secs() -> u64 {
    60
}

fn default_search_timeout_secs() -> u64 {
    15
}

fn default_gallery_path() -> PathBuf {
    PathBuf::from("posters/saved_posters.json")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            huggingface_api_key: None,
            unsplash_access_key: None,
            openai_api_key: None,
            tmdb_api_key: None,
            huggingface_model_url: default_model_url(),
            generation_timeout_secs: default_generation_timeout_secs(),
            search_timeout_secs: default_search_timeout_secs(),
            gallery_path: default_gallery_path(),
            catalog_path: None,
        }
    }
}

impl Config {
    /// Reads `path` if it exists, then lets the usual API key environment
    /// variables override the file. A missing file is not an error: every
    /// remote service degrades to its fallback without a key.
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if fs::try_exists(path).await.unwrap_or(false) {
            let content = fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            serde_json::from_str::<Config>(&content)
                .with_context(|| format!("Invalid config: {}", path.display()))?
        } else {
            Config::default()
        };

        config.apply_env(|name| std::env::var(name).ok());

        if config.generation_timeout_secs == 0 {
            anyhow::bail!("config.json: generation_timeout_secs must be positive");
        }
        if config.search_timeout_secs == 0 {
            anyhow::bail!("config.json: search_timeout_secs must be positive");
        }

        Ok(config)
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let pairs: [(&str, &mut Option<String>); 4] = [
            ("HUGGINGFACE_API_KEY", &mut self.huggingface_api_key),
            ("UNSPLASH_ACCESS_KEY", &mut self.unsplash_access_key),
            ("OPENAI_API_KEY", &mut self.openai_api_key),
            ("TMDB_API_KEY", &mut self.tmdb_api_key),
        ];
        for (name, slot) in pairs {
            if let Some(value) = lookup(name).filter(|v| !v.trim().is_empty()) {
                *slot = Some(value);
            }
        }

        for slot in [
            &mut self.huggingface_api_key,
            &mut self.unsplash_access_key,
            &mut self.openai_api_key,
            &mut self.tmdb_api_key,
        ] {
            if slot.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *slot = None;
            }
        }
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path().join("absent.json")).await.unwrap();
        assert_eq!(config.generation_timeout(), Duration::from_secs(60));
        assert_eq!(config.gallery_path, PathBuf::from("posters/saved_posters.json"));
        assert_eq!(config.catalog_path, None);
    }

    #[tokio::test]
    async fn file_values_are_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"search_timeout_secs": 5, "catalog_path": "catalog.json", "tmdb_api_key": "abc"}"#,
        )
        .unwrap();

        let config = Config::load(&path).await.unwrap();
        assert_eq!(config.search_timeout(), Duration::from_secs(5));
        assert_eq!(config.catalog_path, Some(PathBuf::from("catalog.json")));
        assert!(config.tmdb_api_key.is_some());
    }

    #[tokio::test]
    async fn zero_timeout_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"generation_timeout_secs": 0}"#).unwrap();
        assert!(Config::load(&path).await.is_err());
    }

    #[test]
    fn env_overrides_file_and_blank_keys_are_dropped() {
        let mut config = Config {
            openai_api_key: Some("from-file".to_string()),
            unsplash_access_key: Some("   ".to_string()),
            ..Config::default()
        };
        config.apply_env(|name| match name {
            "OPENAI_API_KEY" => Some("from-env".to_string()),
            "TMDB_API_KEY" => Some(String::new()),
            _ => None,
        });

        assert_eq!(config.openai_api_key.as_deref(), Some("from-env"));
        assert_eq!(config.unsplash_access_key, None);
        assert_eq!(config.tmdb_api_key, None);
    }
}
