use crate::catalog::{select_fallback, FallbackCatalog};
use crate::error::PosterError;
use crate::events::{EventObserver, GenerationEvent};
use crate::form::{Genre, MovieFormData};
use crate::prompt::{build_prompt, extract_keywords};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Turns a prompt into an image reference (a URL or a `data:` URL).
#[async_trait]
pub trait RemoteGenerator: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, PosterError>;
}

/// Keyword search against a stock-photo library, consulted before the
/// static catalog when remote generation fails.
#[async_trait]
pub trait ImageSearch: Send + Sync {
    fn name(&self) -> &str;

    async fn search(&self, keywords: &str) -> Result<Option<String>, PosterError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PosterSource {
    Remote,
    Search,
    Catalog,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPoster {
    pub id: i64,
    #[serde(rename = "posterUrl")]
    pub image_reference: String,
    #[serde(rename = "movieData")]
    pub source_form: MovieFormData,
    #[serde(default = "catalog_source")]
    pub source: PosterSource,
    pub created_at: DateTime<Utc>,
}

fn catalog_source() -> PosterSource {
    PosterSource::Catalog
}

impl GeneratedPoster {
    pub fn new(image_reference: String, source_form: MovieFormData, source: PosterSource) -> Self {
        let created_at = Utc::now();
        Self {
            id: created_at.timestamp_millis(),
            image_reference,
            source_form,
            source,
            created_at,
        }
    }
}

/// Prompt building, one remote attempt, then search and catalog fallbacks.
pub struct PosterGenerator {
    remote: Arc<dyn RemoteGenerator>,
    search: Option<Arc<dyn ImageSearch>>,
    catalog: Arc<FallbackCatalog>,
    rng: Mutex<Box<dyn RngCore + Send>>,
    generation_timeout: Duration,
    search_timeout: Duration,
    observer: Option<EventObserver>,
}

impl PosterGenerator {
    pub fn new(remote: Arc<dyn RemoteGenerator>, catalog: Arc<FallbackCatalog>) -> Self {
        Self {
            remote,
            search: None,
            catalog,
            rng: Mutex::new(Box::new(StdRng::from_entropy())),
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
            search_timeout: DEFAULT_SEARCH_TIMEOUT,
            observer: None,
        }
    }

    pub fn with_search(mut self, search: Arc<dyn ImageSearch>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn with_rng(mut self, rng: Box<dyn RngCore + Send>) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    pub fn with_timeouts(mut self, generation: Duration, search: Duration) -> Self {
        self.generation_timeout = generation;
        self.search_timeout = search;
        self
    }

    pub fn with_observer(mut self, observer: EventObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn catalog(&self) -> &FallbackCatalog {
        &self.catalog
    }

    /// Always resolves to a poster. Remote and search failures are reported
    /// through the observer and replaced by a fallback image.
    ///
    /// Nothing is logged here; attach [`crate::events::log_observer`] to
    /// mirror the events into the log.
    pub async fn generate(&self, form: &MovieFormData) -> GeneratedPoster {
        let prompt = build_prompt(form);
        self.emit(GenerationEvent::PromptBuilt {
            prompt: prompt.clone(),
        });

        let (reference, source) = match self.call_remote(&prompt).await {
            Ok(reference) => {
                self.emit(GenerationEvent::RemoteSucceeded {
                    generator: self.remote.name().to_string(),
                });
                (reference, PosterSource::Remote)
            }
            Err(err) => {
                self.emit(GenerationEvent::RemoteFailed {
                    generator: self.remote.name().to_string(),
                    reason: err.to_string(),
                });
                self.resolve_fallback(form.genre(), &prompt).await
            }
        };

        GeneratedPoster::new(reference, form.clone(), source)
    }

    async fn call_remote(&self, prompt: &str) -> Result<String, PosterError> {
        let reference = with_timeout(
            self.remote.name(),
            self.generation_timeout,
            self.remote.generate(prompt),
        )
        .await?;

        if reference.trim().is_empty() {
            return Err(PosterError::EmptyResponse("remote generator"));
        }
        Ok(reference)
    }

    async fn resolve_fallback(&self, genre: &Genre, prompt: &str) -> (String, PosterSource) {
        if let Some(search) = self.search.as_ref() {
            let keywords = extract_keywords(prompt);
            match with_timeout(search.name(), self.search_timeout, search.search(&keywords)).await {
                Ok(Some(reference)) if !reference.trim().is_empty() => {
                    self.emit(GenerationEvent::SearchSucceeded { keywords });
                    return (reference, PosterSource::Search);
                }
                Ok(_) => self.emit(GenerationEvent::SearchMissed { keywords }),
                Err(err) => self.emit(GenerationEvent::SearchFailed {
                    keywords,
                    reason: err.to_string(),
                }),
            }
        }

        let reference = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            select_fallback(genre, &self.catalog, &mut **rng)
        };
        self.emit(GenerationEvent::FallbackSelected {
            genre: genre.to_string(),
            reference: reference.clone(),
        });
        (reference, PosterSource::Catalog)
    }

    fn emit(&self, event: GenerationEvent) {
        if let Some(observer) = self.observer.as_ref() {
            observer(&event);
        }
    }
}

async fn with_timeout<T>(
    service: &str,
    limit: Duration,
    call: impl Future<Output = Result<T, PosterError>>,
) -> Result<T, PosterError> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(PosterError::Timeout {
            service: service.to_string(),
            limit,
        }),
    }
}
