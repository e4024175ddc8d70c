//! Per-run state shared by the source adapter and the synchronizer

use log::debug;

use crate::error::MirrorError;
use crate::models::Node;
use crate::source::{normalize_item, ItemCache, ItemSource};

/// Strictly increasing counter used to order records in mail clients
///
/// Values are only meaningful within one run.
#[derive(Debug, Default, Clone)]
pub struct Sequence {
    last: i64,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next value, starting at 1
    pub fn next_value(&mut self) -> i64 {
        self.last += 1;
        self.last
    }
}

/// State for one mirror run: the item source, its memo and the sequence
pub struct Session {
    source: Box<dyn ItemSource>,
    cache: ItemCache,
    sequence: Sequence,
}

impl Session {
    pub fn new(source: impl ItemSource + 'static) -> Self {
        Self::with_cache(source, ItemCache::new())
    }

    /// Start a session with items already memoized, e.g. from a snapshot
    pub fn with_cache(source: impl ItemSource + 'static, cache: ItemCache) -> Self {
        Self {
            source: Box::new(source),
            cache,
            sequence: Sequence::new(),
        }
    }

    /// Fetch one node, consulting the memo first
    pub fn fetch(&mut self, id: &str) -> Result<Node, MirrorError> {
        if let Some(item) = self.cache.get(id) {
            return Ok(normalize_item(item.clone()));
        }

        let item = self
            .source
            .fetch_item(id)
            .map_err(|source| MirrorError::Fetch {
                id: id.to_string(),
                source,
            })?
            .ok_or_else(|| MirrorError::ItemNotFound(id.to_string()))?;

        debug!("fetched item {} ({})", id, item.kind);
        self.cache.insert(id, item.clone());
        Ok(normalize_item(item))
    }

    pub fn sequence(&mut self) -> &mut Sequence {
        &mut self.sequence
    }

    pub fn cache(&self) -> &ItemCache {
        &self.cache
    }
}
