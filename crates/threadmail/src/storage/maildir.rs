//! Maildir-backed record storage

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use anyhow::{Context, Result, anyhow};
use log::debug;
use maildir::Maildir;

use super::{RecordKey, RecordStore};

/// Record storage in a Maildir
///
/// Directory structure:
/// ```text
/// <root>/
///   tmp/    # deliveries in progress
///   new/    # records created or changed by the last run
///   cur/    # records the mail client has seen
/// ```
/// Delivery and listing go through [`maildir::Maildir`]. Marking a record
/// as changed moves it from `cur/` back to `new/`, which the crate has no
/// operation for.
pub struct MaildirStore {
    maildir: Maildir,
    /// Known location of each record, filled by listing and delivery
    locations: RwLock<HashMap<RecordKey, PathBuf>>,
}

impl MaildirStore {
    /// Open the Maildir at `root`, creating it if needed
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let maildir = Maildir::from(root.to_path_buf());
        maildir
            .create_dirs()
            .with_context(|| format!("Failed to create maildir: {}", root.display()))?;
        Ok(Self {
            maildir,
            locations: RwLock::new(HashMap::new()),
        })
    }

    /// Full path of a record, looking in `new/` and `cur/`
    pub fn path_of(&self, key: &RecordKey) -> Result<PathBuf> {
        if let Some(path) = self.locations.read().unwrap().get(key)
            && path.exists()
        {
            return Ok(path.clone());
        }

        let entry = self.maildir.find(key.as_str()).ok_or_else(|| {
            anyhow!(
                "No record with key {} in {}",
                key,
                self.maildir.path().display()
            )
        })?;
        let path = entry.path().clone();
        self.locations
            .write()
            .unwrap()
            .insert(key.clone(), path.clone());
        Ok(path)
    }

    fn subdir(&self, name: &str) -> PathBuf {
        self.maildir.path().join(name)
    }
}

impl RecordStore for MaildirStore {
    fn list_keys(&self) -> Result<Vec<RecordKey>> {
        let mut locations = self.locations.write().unwrap();
        let mut keys = Vec::new();

        for entry in self.maildir.list_new().chain(self.maildir.list_cur()) {
            let entry = entry.with_context(|| {
                format!("Failed to list {}", self.maildir.path().display())
            })?;
            let key = RecordKey::new(entry.id());
            locations.insert(key.clone(), entry.path().clone());
            keys.push(key);
        }

        keys.sort();
        Ok(keys)
    }

    fn read(&self, key: &RecordKey) -> Result<String> {
        let path = self.path_of(key)?;
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
    }

    fn deliver(&self, contents: &str) -> Result<RecordKey> {
        let id = self
            .maildir
            .store_new(contents.as_bytes())
            .with_context(|| format!("Failed to deliver into {}", self.maildir.path().display()))?;

        let key = RecordKey::new(id);
        let path = self.subdir("new").join(key.as_str());
        self.locations.write().unwrap().insert(key.clone(), path);
        Ok(key)
    }

    /// Replace the record's text through `tmp/`, keeping its file name
    fn rewrite(&self, key: &RecordKey, contents: &str) -> Result<()> {
        let path = self.path_of(key)?;
        let tmp = self.subdir("tmp").join(key.as_str());
        fs::write(&tmp, contents).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to move {} to {}", tmp.display(), path.display()))
    }

    fn mark_changed(&self, key: &RecordKey) -> Result<bool> {
        let path = self.path_of(key)?;
        if path.parent() != Some(self.subdir("cur").as_path()) {
            return Ok(false);
        }

        // new/ entries carry no info suffix
        let target = self.subdir("new").join(key.as_str());
        fs::rename(&path, &target).with_context(|| {
            format!("Failed to move {} to {}", path.display(), target.display())
        })?;
        debug!("Renamed {} to {}", path.display(), target.display());

        self.locations.write().unwrap().insert(key.clone(), target);
        Ok(true)
    }
}
