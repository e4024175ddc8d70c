//! Threadmail - mirror discussion threads into a Maildir
//!
//! This crate provides the platform-independent pieces of post2mail:
//! - Domain models (HnItem, Node, MessageId)
//! - Hacker News API client and item normalization
//! - The mail text format records are stored in
//! - Storage trait abstractions with Maildir and in-memory backends
//! - Idempotent thread sync engine
//! - The top-level mirror run used by the CLI

pub mod config;
pub mod error;
pub mod mirror;
pub mod models;
pub mod record;
pub mod session;
pub mod source;
pub mod storage;
pub mod sync;

pub use config::Settings;
pub use error::MirrorError;
pub use mirror::{MirrorOptions, MirrorReport, dump, run};
pub use models::{HnItem, MessageId, Node, NodeKind};
pub use record::{Email, StoredRecord, format_date};
pub use session::{Sequence, Session};
pub use source::{HnClient, ItemCache, ItemSource, Snapshot, StaticSource};
pub use storage::{InMemoryRecordStore, MaildirStore, RecordKey, RecordStore};
pub use sync::{MessageIndex, SyncOptions, SyncOutcome, SyncStats, sync_thread};
