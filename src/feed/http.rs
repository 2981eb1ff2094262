use super::types::PageRef;
use super::PageFetcher;
use crate::config::FeedConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

const HAL_JSON: &str = "application/hal+json";

/// Fetches feed pages over HTTP. `next` hrefs are resolved against the endpoint,
/// so feeds that publish relative links work too.
pub struct HttpFeedEndpoint {
    client: Client,
    endpoint: Url,
}

impl HttpFeedEndpoint {
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint)
            .with_context(|| format!("invalid feed endpoint: {}", config.endpoint))?;
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .user_agent(config.user_agent.as_str())
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Turn a page reference into an absolute URL.
    pub fn resolve(&self, page: &PageRef) -> Result<Url> {
        self.endpoint
            .join(page.href())
            .with_context(|| format!("invalid page href: {}", page))
    }

    async fn get(&self, url: Url) -> Result<String> {
        let resp = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, HAL_JSON)
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("GET {} ({}): {}", url, status, body);
        }

        resp.text()
            .await
            .with_context(|| format!("failed to read body of {}", url))
    }
}

#[async_trait]
impl PageFetcher for HttpFeedEndpoint {
    async fn fetch_initial(&self) -> Result<String> {
        self.get(self.endpoint.clone()).await
    }

    async fn fetch(&self, page: &PageRef) -> Result<String> {
        let url = self.resolve(page)?;
        self.get(url).await
    }

    fn describe_initial(&self) -> String {
        self.endpoint.to_string()
    }
}
