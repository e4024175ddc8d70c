//! Top-level mirror run
//!
//! Resolves what to mirror (a thread URL, or a directory mirrored before),
//! lays out the post directory, syncs the thread into its Maildir and saves
//! a snapshot of every fetched item next to it.

use anyhow::{Context, Result};
use log::{error, info, warn};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::error::MirrorError;
use crate::models::Node;
use crate::session::Session;
use crate::storage::MaildirStore;
use crate::sync::{SyncOptions, SyncOutcome, SyncStats, sync_thread};

/// Host of the only supported source
pub const HN_HOST: &str = "news.ycombinator.com";

/// File in the post directory remembering the thread URL
pub const URL_FILE: &str = "url.txt";

/// Characters dropped from directory names
static NON_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9a-zA-Z_-]+").expect("valid directory name pattern"));

/// Options for a mirror run
#[derive(Debug, Clone)]
pub struct MirrorOptions {
    /// Write into this directory instead of one named after the post
    pub output_dir: Option<PathBuf>,
    /// Where post directories are created for URL arguments
    pub base_dir: PathBuf,
    pub sync: SyncOptions,
}

impl Default for MirrorOptions {
    fn default() -> Self {
        Self {
            output_dir: None,
            base_dir: PathBuf::from("."),
            sync: SyncOptions::default(),
        }
    }
}

/// Result of a mirror run
#[derive(Debug, Clone)]
pub struct MirrorReport {
    /// Thread URL that was mirrored
    pub url: String,
    /// Maildir the thread was written to
    pub post_dir: PathBuf,
    pub stats: SyncStats,
}

/// Mirror the thread named by `arg` into its post directory
///
/// `arg` is either an `https://` thread URL or a directory holding a
/// `url.txt` from an earlier run.
pub fn run(
    session: &mut Session,
    arg: &str,
    options: &MirrorOptions,
    on_progress: impl FnMut(usize, SyncOutcome),
) -> Result<MirrorReport> {
    let url = resolve_url(arg)?;
    let root_id = root_item_id(&url)?;
    let root = session.fetch(&root_id)?;

    let post_dir = match &options.output_dir {
        Some(dir) => dir.clone(),
        None if is_url(arg) => options.base_dir.join(post_dir_name(&root)),
        None => relocate_post_dir(Path::new(arg), &post_dir_name(&root))?,
    };

    let store = MaildirStore::open(&post_dir)?;
    save_post_url(&post_dir, &url)?;

    let stats = sync_thread(session, &store, &root, &options.sync, on_progress)?;
    info!(
        "{}: {} new, {} updated, {} changed",
        post_dir.display(),
        stats.records_created,
        stats.records_rewritten,
        stats.records_changed
    );

    let snapshot_path = snapshot_path(&post_dir);
    if let Err(e) = session.cache().to_snapshot(&url).save(&snapshot_path) {
        error!("Write snapshot: {:#}", e);
    }

    Ok(MirrorReport {
        url,
        post_dir,
        stats,
    })
}

/// Fetch only the root item of `url` and render its raw JSON
pub fn dump(session: &mut Session, url: &str) -> Result<String> {
    let root_id = root_item_id(url)?;
    let root = session.fetch(&root_id)?;
    let json = match &root {
        Node::HackerNews(node) => serde_json::to_string(node.item()),
    };
    json.context("Failed to serialize item")
}

fn is_url(arg: &str) -> bool {
    arg.starts_with("https://")
}

/// Thread URL for a mirror argument
pub fn resolve_url(arg: &str) -> Result<String> {
    if is_url(arg) {
        return Ok(arg.to_string());
    }

    let url_file = Path::new(arg).join(URL_FILE);
    let url = std::fs::read_to_string(&url_file)
        .with_context(|| format!("Failed to read {}", url_file.display()))?;
    Ok(url.trim().to_string())
}

/// Item id of the thread root named by a Hacker News URL
pub fn root_item_id(href: &str) -> Result<String, MirrorError> {
    let url = url::Url::parse(href).map_err(|e| MirrorError::InvalidUrl(format!("{}: {}", href, e)))?;

    let host = url.host_str().unwrap_or_default().to_lowercase();
    if host != HN_HOST {
        return Err(MirrorError::UnsupportedUrl(host));
    }

    url.query_pairs()
        .find(|(k, _)| k == "id")
        .map(|(_, v)| v.into_owned())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| MirrorError::InvalidUrl(format!("{}: missing id", href)))
}

/// Directory name for a post, derived from its subject
pub fn post_dir_name(node: &Node) -> String {
    let mut name = node.subject().to_string();
    if name.is_empty() {
        let head: String = node.body().chars().take(20).collect();
        name = format!("{}{}", node.message_id(), head);
    }
    NON_TEXT.replace_all(&name, "_").into_owned()
}

/// Move a previously mirrored directory after the post title changed
///
/// Returns the directory to write into. Refuses to overwrite an existing
/// directory for the new title.
fn relocate_post_dir(old: &Path, name: &str) -> Result<PathBuf> {
    let old = old.components().collect::<PathBuf>();
    let new = match old.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    };
    if new == old {
        return Ok(new);
    }

    if new.exists() {
        return Err(MirrorError::Conflict { old, new }.into());
    }
    std::fs::rename(&old, &new)
        .with_context(|| format!("Rename {} to {}", old.display(), new.display()))?;
    warn!(
        "post title has changed:\n\told: {}\n\tnew: {}",
        old.display(),
        new.display()
    );
    Ok(new)
}

/// Remember the thread URL; an existing url.txt is left alone
pub fn save_post_url(dir: &Path, url: &str) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let url_file = dir.join(URL_FILE);
    if url_file.exists() {
        return Ok(());
    }
    std::fs::write(&url_file, url).with_context(|| format!("Failed to write {}", url_file.display()))
}

/// Snapshot file of a post directory: `<dir>/<dirname>.json`
pub fn snapshot_path(post_dir: &Path) -> PathBuf {
    let name = post_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "snapshot".to_string());
    post_dir.join(format!("{}.json", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HnItem;
    use crate::source::normalize_item;
    use tempfile::tempdir;

    fn story(title: &str, text: &str) -> Node {
        normalize_item(HnItem {
            id: 8863,
            kind: "story".to_string(),
            title: title.to_string(),
            text: text.to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_root_item_id() {
        let id = root_item_id("https://news.ycombinator.com/item?id=8863").unwrap();
        assert_eq!(id, "8863");

        let id = root_item_id("https://News.YCombinator.com/item?foo=1&id=42").unwrap();
        assert_eq!(id, "42");
    }

    #[test]
    fn test_root_item_id_unsupported_host() {
        let err = root_item_id("https://lobste.rs/s/abc").unwrap_err();
        assert!(matches!(err, MirrorError::UnsupportedUrl(host) if host == "lobste.rs"));
    }

    #[test]
    fn test_root_item_id_missing_id() {
        let err = root_item_id("https://news.ycombinator.com/news").unwrap_err();
        assert!(matches!(err, MirrorError::InvalidUrl(_)));
        assert!(matches!(root_item_id("not a url"), Err(MirrorError::InvalidUrl(_))));
    }

    #[test]
    fn test_post_dir_name() {
        let node = story("Show HN: A tiny Maildir mirror (2024)", "");
        assert_eq!(post_dir_name(&node), "Show_HN_A_tiny_Maildir_mirror_2024_");
    }

    #[test]
    fn test_post_dir_name_without_subject() {
        let node = story("", "");
        assert_eq!(post_dir_name(&node), "_hackernews-8863_");
    }

    #[test]
    fn test_resolve_url_from_dir() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(URL_FILE),
            "https://news.ycombinator.com/item?id=1\n",
        )
        .unwrap();

        let url = resolve_url(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(url, "https://news.ycombinator.com/item?id=1");
    }

    #[test]
    fn test_resolve_url_passthrough() {
        let url = resolve_url("https://news.ycombinator.com/item?id=1").unwrap();
        assert_eq!(url, "https://news.ycombinator.com/item?id=1");
    }

    #[test]
    fn test_save_post_url_keeps_existing() {
        let dir = tempdir().unwrap();
        save_post_url(dir.path(), "https://first").unwrap();
        save_post_url(dir.path(), "https://second").unwrap();

        let saved = std::fs::read_to_string(dir.path().join(URL_FILE)).unwrap();
        assert_eq!(saved, "https://first");
    }

    #[test]
    fn test_relocate_renames() {
        let dir = tempdir().unwrap();
        let old = dir.path().join("Old_title");
        std::fs::create_dir(&old).unwrap();

        let new = relocate_post_dir(&old, "New_title").unwrap();

        assert_eq!(new, dir.path().join("New_title"));
        assert!(new.is_dir());
        assert!(!old.exists());
    }

    #[test]
    fn test_relocate_same_name_is_noop() {
        let dir = tempdir().unwrap();
        let old = dir.path().join("Same");
        std::fs::create_dir(&old).unwrap();

        assert_eq!(relocate_post_dir(&old, "Same").unwrap(), old);
        assert!(old.is_dir());
    }

    #[test]
    fn test_relocate_conflict() {
        let dir = tempdir().unwrap();
        let old = dir.path().join("Old_title");
        let taken = dir.path().join("New_title");
        std::fs::create_dir(&old).unwrap();
        std::fs::create_dir(&taken).unwrap();

        let err = relocate_post_dir(&old, "New_title").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MirrorError>(),
            Some(MirrorError::Conflict { .. })
        ));
        assert!(old.is_dir());
    }

    #[test]
    fn test_snapshot_path() {
        assert_eq!(
            snapshot_path(Path::new("out/My_Post")),
            PathBuf::from("out/My_Post/My_Post.json")
        );
    }
}
