use serde::Serialize;
use std::sync::Arc;

/// What happened during one poster generation.
///
/// Failures of the remote calls surface here instead of as errors, since
/// [`crate::PosterGenerator::generate`] always resolves to a poster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GenerationEvent {
    PromptBuilt {
        prompt: String,
    },
    RemoteSucceeded {
        generator: String,
    },
    RemoteFailed {
        generator: String,
        reason: String,
    },
    SearchSucceeded {
        keywords: String,
    },
    SearchMissed {
        keywords: String,
    },
    SearchFailed {
        keywords: String,
        reason: String,
    },
    FallbackSelected {
        genre: String,
        reference: String,
    },
}

pub type EventObserver = Arc<dyn Fn(&GenerationEvent) + Send + Sync + 'static>;

/// Observer that mirrors every event into the crate log.
pub fn log_observer() -> EventObserver {
    Arc::new(log_event)
}

fn log_event(event: &GenerationEvent) {
    match event {
        GenerationEvent::PromptBuilt { prompt } => {
            crate::logi(format!("Generating poster with prompt: {}", prompt))
        }
        GenerationEvent::RemoteSucceeded { generator } => {
            crate::logok(format!("{} returned a poster", generator))
        }
        GenerationEvent::RemoteFailed { generator, reason } => {
            crate::logw(format!("{} failed: {}", generator, reason))
        }
        GenerationEvent::SearchSucceeded { keywords } => {
            crate::logok(format!("Stock search hit for '{}'", keywords))
        }
        GenerationEvent::SearchMissed { keywords } => {
            crate::logw(format!("Stock search found nothing for '{}'", keywords))
        }
        GenerationEvent::SearchFailed { keywords, reason } => {
            crate::logw(format!("Stock search for '{}' failed: {}", keywords, reason))
        }
        GenerationEvent::FallbackSelected { genre, reference } => {
            crate::logi(format!("Using {} fallback image {}", genre, reference))
        }
    }
}
