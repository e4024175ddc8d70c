//! Error kinds surfaced by a mirror run

use std::path::PathBuf;

/// Errors raised while fetching, storing, or laying out a mirrored thread
///
/// Everything except a per-child [`MirrorError::Fetch`] aborts the run.
#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    /// Transport or parse failure fetching one item
    #[error("failed to fetch item {id}")]
    Fetch {
        id: String,
        #[source]
        source: anyhow::Error,
    },

    /// The source answered but has no item with this id
    #[error("item {0} does not exist")]
    ItemNotFound(String),

    /// An existing record could not be listed or read
    #[error("failed to read record {key}")]
    StoreRead {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// A record could not be delivered or rewritten
    #[error("failed to write record for {message_id}")]
    StoreWrite {
        message_id: String,
        #[source]
        source: anyhow::Error,
    },

    /// An existing record carries no Message-ID header
    #[error("could not get message id from record {0}")]
    MissingMessageId(String),

    /// The post title changed but a directory for the new title already exists
    #[error(
        "post title changed but directory for new title already exists\n\told title: {}\n\tnew title: {}",
        .old.display(),
        .new.display()
    )]
    Conflict { old: PathBuf, new: PathBuf },

    #[error("bad url: {0}")]
    InvalidUrl(String),

    #[error("unsupported url: {0}")]
    UnsupportedUrl(String),

    /// Reading or parsing a snapshot file failed
    #[error("failed to load snapshot {}", .path.display())]
    Snapshot {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

impl MirrorError {
    /// Whether the traversal may skip the failing subtree and continue
    pub fn is_skippable(&self) -> bool {
        matches!(self, MirrorError::Fetch { .. } | MirrorError::ItemNotFound(_))
    }
}
