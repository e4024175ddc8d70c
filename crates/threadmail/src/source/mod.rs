//! Hacker News source adapter
//!
//! This module provides:
//! - The [`ItemSource`] capability the synchronizer fetches through
//! - A blocking Firebase API client
//! - Item normalization into [`crate::models::Node`]
//! - The per-run item memo and its on-disk snapshot

mod cache;
mod client;
mod normalize;

pub use cache::{ItemCache, Snapshot};
pub use client::HnClient;
pub use normalize::{html_unescape, normalize_item, SUBJECT_MAX_CHARS};

use anyhow::Result;

use crate::models::HnItem;

/// Capability to fetch one raw item by id
///
/// Implementations perform the remote lookup only; memoization lives in
/// [`crate::session::Session`]. `Ok(None)` means the source has no such item.
pub trait ItemSource {
    fn fetch_item(&self, id: &str) -> Result<Option<HnItem>>;
}

/// A source with no remote side, for replaying snapshots offline and tests
#[derive(Debug, Default, Clone)]
pub struct StaticSource {
    items: std::collections::HashMap<String, HnItem>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: impl IntoIterator<Item = HnItem>) -> Self {
        let mut source = Self::new();
        for item in items {
            source.insert(item);
        }
        source
    }

    pub fn insert(&mut self, item: HnItem) {
        self.items.insert(item.id.to_string(), item);
    }
}

impl ItemSource for StaticSource {
    fn fetch_item(&self, id: &str) -> Result<Option<HnItem>> {
        Ok(self.items.get(id).cloned())
    }
}
