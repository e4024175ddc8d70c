//! Per-run item memo and its snapshot file

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::MirrorError;
use crate::models::HnItem;

/// Items fetched during one run, keyed by identity
#[derive(Debug, Default, Clone)]
pub struct ItemCache {
    items: BTreeMap<String, HnItem>,
}

impl ItemCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&HnItem> {
        self.items.get(id)
    }

    /// Memoize an item; the first fetch of an id wins
    pub fn insert(&mut self, id: impl Into<String>, item: HnItem) {
        self.items.entry(id.into()).or_insert(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Capture the cache together with the thread URL it was built for
    pub fn to_snapshot(&self, url: impl Into<String>) -> Snapshot {
        Snapshot {
            url: url.into(),
            items: self.items.clone(),
        }
    }
}

impl From<Snapshot> for ItemCache {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            items: snapshot.items,
        }
    }
}

/// Every item fetched for a thread, saved next to the Maildir
///
/// Replaying a snapshot reproduces a run without touching the network.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Thread URL the snapshot was taken from
    pub url: String,
    pub items: BTreeMap<String, HnItem>,
}

impl Snapshot {
    /// Read a snapshot file
    pub fn load(path: &Path) -> Result<Self, MirrorError> {
        let read = || -> anyhow::Result<Self> {
            let content = std::fs::read_to_string(path).context("Failed to read snapshot")?;
            serde_json::from_str(&content).context("Failed to parse snapshot")
        };
        read().map_err(|source| MirrorError::Snapshot {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the snapshot as a single JSON line
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let mut content = serde_json::to_string(self).context("Failed to serialize snapshot")?;
        content.push('\n');
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write snapshot: {}", path.display()))
    }
}
