//! Hacker News Firebase API client
//!
//! Uses synchronous HTTP (ureq); fetches are issued one at a time in
//! traversal order.

use anyhow::{Context, Result};
use log::debug;
use std::time::Duration;

use super::ItemSource;
use crate::models::HnItem;

/// Blocking client for `https://hacker-news.firebaseio.com/v0`
pub struct HnClient {
    agent: ureq::Agent,
    base_url: String,
}

impl HnClient {
    /// Default Firebase API base URL
    pub const BASE_URL: &'static str = "https://hacker-news.firebaseio.com/v0";

    /// Create a client for the given API base URL
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// URL of the JSON document for one item
    pub fn item_url(&self, id: &str) -> String {
        format!("{}/item/{}.json", self.base_url, id)
    }
}

impl Default for HnClient {
    fn default() -> Self {
        Self::new(Self::BASE_URL, Duration::from_secs(30))
    }
}

impl ItemSource for HnClient {
    fn fetch_item(&self, id: &str) -> Result<Option<HnItem>> {
        let url = self.item_url(id);
        debug!("{}", url);

        let mut response = self
            .agent
            .get(&url)
            .call()
            .with_context(|| format!("Failed to send item request: {}", url))?;

        let body = response
            .body_mut()
            .read_to_string()
            .context("Failed to read item response")?;
        debug!("\t{} bytes", body.len());

        // the API answers `null` for ids it does not know
        let item: Option<HnItem> =
            serde_json::from_str(&body).context("Failed to parse item response")?;
        Ok(item)
    }
}
