pub mod hal;
pub mod http;
pub mod types;

use anyhow::Result;
use async_trait::async_trait;
use types::{Page, PageRef};

/// Transport for feed pages. Returns the raw document.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_initial(&self) -> Result<String>;
    async fn fetch(&self, page: &PageRef) -> Result<String>;

    /// Human-readable name of the initial page, for logs and errors.
    fn describe_initial(&self) -> String {
        "initial page".to_string()
    }
}

pub trait PageParser: Send + Sync {
    fn parse(&self, raw: &str) -> Result<Page>;
}
