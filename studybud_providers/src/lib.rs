#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Generative backend implementations.

mod gemini;
mod retry;

pub use gemini::GeminiBackend;
pub use retry::retry_with_backoff;

use std::sync::{Arc, OnceLock};
use studybud_core::GenerativeBackend;
use tracing::{info, warn};

static SHARED_BACKEND: OnceLock<Option<Arc<GeminiBackend>>> = OnceLock::new();

/// Process-wide backend handle.
///
/// Constructed at most once, on first access, race-safe. When no API key is
/// configured or construction fails, the slot stays empty for the life of
/// the process and every caller sees an explicit `None`.
pub fn shared(api_key: &str, model: &str) -> Option<Arc<dyn GenerativeBackend>> {
    SHARED_BACKEND
        .get_or_init(|| {
            if api_key.trim().is_empty() {
                info!("No generative backend configured, running in fallback mode");
                return None;
            }
            match GeminiBackend::new(api_key.to_string(), model.to_string()) {
                Ok(backend) => Some(Arc::new(backend)),
                Err(e) => {
                    warn!("Generative backend init failed: {e}");
                    None
                }
            }
        })
        .clone()
        .map(|backend| backend as Arc<dyn GenerativeBackend>)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_handle_is_stable_across_calls() {
        // First call decides; later calls see the same slot even with
        // different arguments.
        let first = shared("", "gemini-1.5-flash");
        let second = shared("some-key", "gemini-1.5-flash");
        assert_eq!(first.is_some(), second.is_some());
    }
}
