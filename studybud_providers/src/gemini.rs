//! Google Gemini backend.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use studybud_core::{BackendError, GenerativeBackend};
use tracing::info;

use crate::retry::retry_with_backoff;

/// Per-request timeout. A slow backend is treated the same as an
/// unavailable one: the caller falls back rather than wait.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Pause before the single re-attempt.
const RETRY_DELAYS: &[Duration] = &[Duration::from_secs(1)];

pub struct GeminiBackend {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiBackend {
    pub fn new(api_key: String, model: String) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| BackendError::Invocation(e.to_string()))?;

        info!("Creating GeminiBackend: model={model}");
        Ok(Self {
            client,
            api_key,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model,
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    async fn try_generate(&self, prompt: &str) -> Result<String, BackendError> {
        let request = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "temperature": 0.5 },
        });

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model
            ))
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| BackendError::Invocation(e.to_string()))?
            .error_for_status()
            .map_err(|e| BackendError::Invocation(e.to_string()))?
            .json::<serde_json::Value>()
            .await
            .map_err(|e| BackendError::Invocation(e.to_string()))?;

        response["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(|text| text.trim().to_string())
            .ok_or_else(|| BackendError::MalformedOutput("missing candidate text".to_string()))
    }
}

#[async_trait]
impl GenerativeBackend for GeminiBackend {
    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        info!("Sending request to Gemini API: model={}", self.model);

        let response = retry_with_backoff(|| self.try_generate(prompt), RETRY_DELAYS).await?;

        info!("Received response from Gemini API");
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_construction_succeeds_with_any_key() {
        let backend = GeminiBackend::new("k".to_string(), "gemini-1.5-flash".to_string());
        assert!(backend.is_ok());
    }

    #[tokio::test]
    async fn unreachable_base_url_yields_invocation_error() {
        let Ok(backend) = GeminiBackend::new("k".to_string(), "gemini-1.5-flash".to_string())
        else {
            panic!("client construction failed");
        };
        let backend = backend.with_base_url("http://127.0.0.1:9".to_string());

        let result = backend.try_generate("hello").await;
        assert!(matches!(result, Err(BackendError::Invocation(_))));
    }
}
