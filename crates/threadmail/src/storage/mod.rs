//! Record storage
//!
//! This module defines the storage abstraction the synchronizer writes
//! through, with a Maildir implementation for real runs and an in-memory
//! one for tests.

mod maildir;
mod memory;
mod traits;

pub use maildir::MaildirStore;
pub use memory::InMemoryRecordStore;
pub use traits::{RecordKey, RecordStore};
