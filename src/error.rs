use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PosterError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0} API key not found")]
    MissingCredential(&'static str),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} HTTP error! status: {status}")]
    Status { service: &'static str, status: u16 },

    #[error("{service} did not answer within {limit:?}")]
    Timeout { service: String, limit: Duration },

    #[error("{0} returned an empty response")]
    EmptyResponse(&'static str),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PosterError {
    /// Failures of the outbound generation/search calls. These never reach
    /// the end user; the orchestrator turns them into a fallback image.
    pub fn is_remote_failure(&self) -> bool {
        matches!(
            self,
            PosterError::MissingCredential(_)
                | PosterError::Http(_)
                | PosterError::Status { .. }
                | PosterError::Timeout { .. }
                | PosterError::EmptyResponse(_)
        )
    }
}
