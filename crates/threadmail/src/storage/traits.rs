//! Storage trait definitions

use anyhow::Result;
use std::fmt;

/// Stable key of one record in a store
///
/// For a Maildir this is the unique part of the file name; it survives the
/// record moving between `new/` and `cur/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey(pub String);

impl RecordKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trait for record storage operations
///
/// Records are opaque text blobs. The store never interprets them; the
/// synchronizer locates records through their Message-ID header.
pub trait RecordStore: Send + Sync {
    /// List the keys of every existing record
    fn list_keys(&self) -> Result<Vec<RecordKey>>;

    /// Read a record's full text
    fn read(&self, key: &RecordKey) -> Result<String>;

    /// Store a new record, returning its key
    fn deliver(&self, contents: &str) -> Result<RecordKey>;

    /// Replace a record's text at its current location
    fn rewrite(&self, key: &RecordKey, contents: &str) -> Result<()>;

    /// Flag a record as newly changed
    ///
    /// Returns false when the record was already flagged and nothing moved.
    fn mark_changed(&self, key: &RecordKey) -> Result<bool>;
}
