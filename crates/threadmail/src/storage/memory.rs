//! In-memory storage implementation
//!
//! Used by tests; mirrors the Maildir's seen/unseen split with a flag.

use anyhow::{Result, anyhow};
use std::collections::BTreeMap;
use std::sync::RwLock;

use super::{RecordKey, RecordStore};

#[derive(Debug, Clone)]
struct MemoryRecord {
    contents: String,
    unseen: bool,
}

/// In-memory implementation of RecordStore
#[derive(Default)]
pub struct InMemoryRecordStore {
    records: RwLock<BTreeMap<RecordKey, MemoryRecord>>,
    next_key: RwLock<u64>,
}

impl InMemoryRecordStore {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Text of every record, in key order
    pub fn contents(&self) -> Vec<String> {
        self.records
            .read()
            .unwrap()
            .values()
            .map(|r| r.contents.clone())
            .collect()
    }

    pub fn is_unseen(&self, key: &RecordKey) -> Option<bool> {
        self.records.read().unwrap().get(key).map(|r| r.unseen)
    }

    /// Number of records flagged unseen
    pub fn unseen_count(&self) -> usize {
        self.records
            .read()
            .unwrap()
            .values()
            .filter(|r| r.unseen)
            .count()
    }

    /// Flag every record as seen, as a mail client would after reading
    pub fn mark_all_seen(&self) {
        for record in self.records.write().unwrap().values_mut() {
            record.unseen = false;
        }
    }
}

impl RecordStore for InMemoryRecordStore {
    fn list_keys(&self) -> Result<Vec<RecordKey>> {
        Ok(self.records.read().unwrap().keys().cloned().collect())
    }

    fn read(&self, key: &RecordKey) -> Result<String> {
        self.records
            .read()
            .unwrap()
            .get(key)
            .map(|r| r.contents.clone())
            .ok_or_else(|| anyhow!("No record with key {}", key))
    }

    fn deliver(&self, contents: &str) -> Result<RecordKey> {
        let mut next = self.next_key.write().unwrap();
        *next += 1;
        let key = RecordKey::new(format!("{:08}", *next));

        self.records.write().unwrap().insert(
            key.clone(),
            MemoryRecord {
                contents: contents.to_string(),
                unseen: true,
            },
        );
        Ok(key)
    }

    fn rewrite(&self, key: &RecordKey, contents: &str) -> Result<()> {
        let mut records = self.records.write().unwrap();
        let record = records
            .get_mut(key)
            .ok_or_else(|| anyhow!("No record with key {}", key))?;
        record.contents = contents.to_string();
        Ok(())
    }

    fn mark_changed(&self, key: &RecordKey) -> Result<bool> {
        let mut records = self.records.write().unwrap();
        let record = records
            .get_mut(key)
            .ok_or_else(|| anyhow!("No record with key {}", key))?;
        if record.unseen {
            return Ok(false);
        }
        record.unseen = true;
        Ok(true)
    }
}
