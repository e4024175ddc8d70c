//! Sync engine for mirroring a thread into a record store
//!
//! Provides idempotent sync operations that can be safely re-run.

mod index;
mod thread;

pub use index::MessageIndex;
pub use thread::{SyncOptions, SyncOutcome, SyncStats, sync_thread};
