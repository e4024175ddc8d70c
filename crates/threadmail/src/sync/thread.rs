//! Thread sync implementation

use log::{debug, error};

use super::MessageIndex;
use crate::error::MirrorError;
use crate::models::Node;
use crate::record::{DEFAULT_RECIPIENT, Email, StoredRecord, format_date};
use crate::session::Session;
use crate::storage::{RecordKey, RecordStore};

/// What happened to one node's record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A new record was delivered
    Created,
    /// The record already existed and was rewritten
    Existing,
}

impl SyncOutcome {
    /// Progress marker printed for this outcome
    pub fn marker(&self) -> char {
        match self {
            SyncOutcome::Created => '+',
            SyncOutcome::Existing => '*',
        }
    }
}

/// Options for a thread sync
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Value of the To header
    pub recipient: String,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            recipient: DEFAULT_RECIPIENT.to_string(),
        }
    }
}

/// Statistics from a sync operation
#[derive(Debug, Default, Clone)]
pub struct SyncStats {
    /// Number of records delivered for nodes seen for the first time
    pub records_created: usize,
    /// Number of existing records rewritten
    pub records_rewritten: usize,
    /// Number of rewritten records whose date or body differed
    pub records_changed: usize,
    /// Number of changed records moved back to unseen
    pub records_marked: usize,
    /// Number of child subtrees skipped because their fetch failed
    pub fetch_errors: usize,
    /// Duration of the sync operation
    pub duration_ms: u64,
}

/// Mirror the thread rooted at `root` into `store`
///
/// Existing records are found through their Message-ID, so running this
/// again over an unchanged thread creates nothing and reports no changes.
/// `on_progress` is called once per node with its depth and outcome.
pub fn sync_thread(
    session: &mut Session,
    store: &dyn RecordStore,
    root: &Node,
    options: &SyncOptions,
    mut on_progress: impl FnMut(usize, SyncOutcome),
) -> Result<SyncStats, MirrorError> {
    let start = std::time::Instant::now();
    let index = MessageIndex::build(store)?;
    debug!("{} existing records", index.len());

    let mut sync = Synchronizer {
        session,
        store,
        index,
        options,
        stats: SyncStats::default(),
        on_progress: &mut on_progress,
    };
    sync.process(None, root, 0)?;

    let mut stats = sync.stats;
    stats.duration_ms = start.elapsed().as_millis() as u64;
    Ok(stats)
}

struct Synchronizer<'a> {
    session: &'a mut Session,
    store: &'a dyn RecordStore,
    index: MessageIndex,
    options: &'a SyncOptions,
    stats: SyncStats,
    on_progress: &'a mut dyn FnMut(usize, SyncOutcome),
}

impl Synchronizer<'_> {
    fn process(&mut self, parent: Option<&Node>, node: &Node, depth: usize) -> Result<(), MirrorError> {
        let message_id = node.message_id();

        let outcome = match self.index.get(&message_id).cloned() {
            Some(key) => {
                self.update(parent, node, &key)?;
                SyncOutcome::Existing
            }
            None => {
                self.create(parent, node)?;
                SyncOutcome::Created
            }
        };
        (self.on_progress)(depth, outcome);

        for child_id in node.children() {
            let child = match self.session.fetch(&child_id) {
                Ok(child) => child,
                Err(e) if e.is_skippable() => {
                    error!("error: {:#}", anyhow::Error::from(e));
                    self.stats.fetch_errors += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };
            self.process(Some(node), &child, depth + 1)?;
        }

        Ok(())
    }

    fn build_email(&mut self, parent: Option<&Node>, node: &Node) -> Email {
        let order = self.session.sequence().next_value();
        Email::for_node(parent, node, order, &self.options.recipient)
    }

    fn create(&mut self, parent: Option<&Node>, node: &Node) -> Result<(), MirrorError> {
        let email = self.build_email(parent, node);
        let key = self
            .store
            .deliver(&email.to_string())
            .map_err(|source| MirrorError::StoreWrite {
                message_id: email.message_id.to_string(),
                source,
            })?;

        self.index.insert(email.message_id, key);
        self.stats.records_created += 1;
        Ok(())
    }

    /// Rewrite an existing record, flagging it if its date or body moved
    fn update(&mut self, parent: Option<&Node>, node: &Node, key: &RecordKey) -> Result<(), MirrorError> {
        let raw = self
            .store
            .read(key)
            .map_err(|source| MirrorError::StoreRead {
                key: key.to_string(),
                source,
            })?;
        let stored = StoredRecord::parse(&raw).map_err(|source| MirrorError::StoreRead {
            key: key.to_string(),
            source,
        })?;

        let mut changed = false;
        let new_date = format_date(node.created_at());
        let old_date = stored.x_date().unwrap_or_default();
        if old_date != new_date {
            debug!(
                "Date changed {}:\n\told: '{}'\n\tnew: '{}'",
                node.message_id(),
                old_date,
                new_date
            );
            changed = true;
        }
        if stored.body() != node.body() {
            debug!("Body changed {}", node.message_id());
            changed = true;
        }

        let email = self.build_email(parent, node);
        self.store
            .rewrite(key, &email.to_string())
            .map_err(|source| MirrorError::StoreWrite {
                message_id: email.message_id.to_string(),
                source,
            })?;
        self.stats.records_rewritten += 1;

        if changed {
            self.stats.records_changed += 1;
            let moved = self
                .store
                .mark_changed(key)
                .map_err(|source| MirrorError::StoreWrite {
                    message_id: email.message_id.to_string(),
                    source,
                })?;
            if moved {
                self.stats.records_marked += 1;
            }
        }

        Ok(())
    }
}
