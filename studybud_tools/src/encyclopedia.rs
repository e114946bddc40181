//! Best-effort Wikipedia summary lookup.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use studybud_core::Encyclopedia;
use tracing::debug;

/// Lookups are best-effort and must stay bounded.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

const SEARCH_URL: &str = "https://en.wikipedia.org/w/api.php";
const SUMMARY_URL: &str = "https://en.wikipedia.org/api/rest_v1/page/summary";

/// Encyclopedia client backed by the public Wikipedia API: a title search
/// followed by a summary fetch for the best match.
pub struct WikipediaClient {
    client: Client,
}

impl WikipediaClient {
    pub fn new() -> anyhow::Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client })
    }

    async fn try_search(&self, query: &str) -> anyhow::Result<String> {
        let response = self
            .client
            .get(SEARCH_URL)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("format", "json"),
                ("srlimit", "1"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<serde_json::Value>()
            .await?;

        let Some(title) = response["query"]["search"][0]["title"].as_str() else {
            return Ok(String::new());
        };

        let mut summary_url = url::Url::parse(SUMMARY_URL)?;
        summary_url
            .path_segments_mut()
            .map_err(|()| anyhow::anyhow!("summary URL cannot be a base"))?
            .push(title);

        let summary = self
            .client
            .get(summary_url)
            .send()
            .await?
            .error_for_status()?
            .json::<serde_json::Value>()
            .await?;

        Ok(summary["extract"].as_str().unwrap_or_default().to_string())
    }
}

#[async_trait]
impl Encyclopedia for WikipediaClient {
    async fn search(&self, query: &str) -> String {
        if query.trim().is_empty() {
            return String::new();
        }
        match self.try_search(query).await {
            Ok(text) => text,
            Err(e) => {
                debug!("Encyclopedia lookup failed: {e}");
                String::new()
            }
        }
    }
}
