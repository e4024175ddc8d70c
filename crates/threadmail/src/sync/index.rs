//! Message-ID to record key table

use std::collections::HashMap;

use crate::error::MirrorError;
use crate::models::MessageId;
use crate::record::StoredRecord;
use crate::storage::{RecordKey, RecordStore};

/// Where each already-mirrored Message-ID lives in the store
///
/// Built once per run by reading every record's Message-ID header. The
/// header is the only thing trusted; file names may change between runs.
#[derive(Debug, Default, Clone)]
pub struct MessageIndex {
    keys: HashMap<MessageId, RecordKey>,
}

impl MessageIndex {
    /// Scan every record in `store`
    ///
    /// Fails if a record cannot be read or carries no Message-ID.
    pub fn build(store: &dyn RecordStore) -> Result<Self, MirrorError> {
        let keys = store.list_keys().map_err(|source| MirrorError::StoreRead {
            key: "*".to_string(),
            source,
        })?;

        let mut index = Self::default();
        for key in keys {
            let raw = store.read(&key).map_err(|source| MirrorError::StoreRead {
                key: key.to_string(),
                source,
            })?;
            let message_id = StoredRecord::parse(&raw)
                .map_err(|source| MirrorError::StoreRead {
                    key: key.to_string(),
                    source,
                })?
                .message_id()
                .ok_or_else(|| MirrorError::MissingMessageId(key.to_string()))?;
            index.insert(message_id, key);
        }
        Ok(index)
    }

    pub fn get(&self, message_id: &MessageId) -> Option<&RecordKey> {
        self.keys.get(message_id)
    }

    pub fn insert(&mut self, message_id: MessageId, key: RecordKey) {
        self.keys.insert(message_id, key);
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
