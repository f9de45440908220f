use once_cell::sync::Lazy;
use std::sync::{Arc, Mutex};

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod form;
pub mod gallery;
pub mod generator;
pub mod init;
pub mod prompt;

pub use catalog::{select_fallback, FallbackCatalog, DEFAULT_GENRE};
pub use error::PosterError;
pub use form::{Genre, MovieFormData, PosterStyle};
pub use generator::{GeneratedPoster, ImageSearch, PosterGenerator, PosterSource, RemoteGenerator};
pub use prompt::{build_prompt, extract_keywords};

pub type PosterLogHook = Arc<Mutex<dyn Fn(&str) + Send + Sync + 'static>>;

static LOG_HOOK: Lazy<Mutex<Option<PosterLogHook>>> = Lazy::new(|| Mutex::new(None));

/// Mirrors every tagged log line to `hook` in addition to `tracing`.
pub fn set_log_hook(hook: Option<PosterLogHook>) {
    if let Ok(mut guard) = LOG_HOOK.lock() {
        *guard = hook;
    }
}

pub(crate) fn logv(tag: &str, message: &str) {
    match tag {
        "WARN" => tracing::warn!("{}", message),
        _ => tracing::info!("{}", message),
    }

    if let Ok(guard) = LOG_HOOK.lock() {
        if let Some(hook) = guard.as_ref() {
            if let Ok(callback) = hook.lock() {
                let line = format!("[{}] {}", tag, message);
                callback(&line);
            }
        }
    }
}

pub(crate) fn logi(message: impl AsRef<str>) {
    logv("INFO", message.as_ref());
}

pub(crate) fn logok(message: impl AsRef<str>) {
    logv("OK", message.as_ref());
}

pub(crate) fn logw(message: impl AsRef<str>) {
    logv("WARN", message.as_ref());
}
