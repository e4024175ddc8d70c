//! Integration tests for the threadmail crate
//!
//! These tests mirror small threads into real Maildirs on disk.

use std::fs;
use std::path::Path;

use tempfile::TempDir;
use threadmail::mirror::{self, MirrorOptions, URL_FILE};
use threadmail::{
    HnItem, ItemCache, MaildirStore, MirrorError, RecordStore, Session, Snapshot, StaticSource,
    StoredRecord, SyncOptions, sync_thread,
};

const THREAD_URL: &str = "https://news.ycombinator.com/item?id=1";

/// Helper to create the four-item thread used throughout
fn thread(title: &str) -> Vec<HnItem> {
    vec![
        HnItem {
            id: 1,
            kind: "story".to_string(),
            by: "op".to_string(),
            title: title.to_string(),
            score: 2,
            time: 1_700_000_000,
            kids: vec![2, 3],
            ..Default::default()
        },
        comment(2, "Hi", vec![]),
        comment(3, "Bye", vec![4]),
        comment(4, "!!", vec![]),
    ]
}

fn comment(id: u64, text: &str, kids: Vec<u64>) -> HnItem {
    HnItem {
        id,
        kind: "comment".to_string(),
        by: format!("user{}", id),
        parent: id - 1,
        text: text.to_string(),
        time: 1_700_000_100 + id as i64,
        kids,
        ..Default::default()
    }
}

/// Every record in a Maildir, parsed
fn records(dir: &Path) -> Vec<StoredRecord> {
    let store = MaildirStore::open(dir).unwrap();
    store
        .list_keys()
        .unwrap()
        .iter()
        .map(|key| StoredRecord::parse(&store.read(key).unwrap()).unwrap())
        .collect()
}

fn find<'a>(records: &'a [StoredRecord], message_id: &str) -> &'a StoredRecord {
    records
        .iter()
        .find(|r| r.header("Message-ID") == Some(message_id))
        .unwrap()
}

/// Move everything in new/ to cur/ as a mail client would
fn read_all(dir: &Path) {
    for entry in fs::read_dir(dir.join("new")).unwrap() {
        let path = entry.unwrap().path();
        let name = format!("{}:2,S", path.file_name().unwrap().to_str().unwrap());
        fs::rename(&path, dir.join("cur").join(name)).unwrap();
    }
}

fn count(dir: &Path) -> usize {
    fs::read_dir(dir).unwrap().count()
}

fn mirror_once(items: Vec<HnItem>, arg: &str, base: &Path) -> mirror::MirrorReport {
    let mut session = Session::new(StaticSource::with_items(items));
    let options = MirrorOptions {
        base_dir: base.to_path_buf(),
        ..Default::default()
    };
    mirror::run(&mut session, arg, &options, |_, _| {}).unwrap()
}

#[test]
fn test_scenario_first_run() {
    let tmp = TempDir::new().unwrap();
    let report = mirror_once(thread("Test"), THREAD_URL, tmp.path());

    assert_eq!(report.post_dir, tmp.path().join("Test"));
    assert_eq!(report.stats.records_created, 4);

    let records = records(&report.post_dir);
    assert_eq!(records.len(), 4);

    let root = find(&records, "<hackernews-1>");
    assert_eq!(root.header("Subject"), Some("(2 points) Test"));
    assert_eq!(root.header("In-Reply-To"), None);

    let nested = find(&records, "<hackernews-4>");
    assert_eq!(nested.header("In-Reply-To"), Some("<hackernews-3>"));
    assert_eq!(nested.body(), "!!");
}

#[test]
fn test_scenario_second_run_changes_nothing() {
    let tmp = TempDir::new().unwrap();
    let report = mirror_once(thread("Test"), THREAD_URL, tmp.path());
    read_all(&report.post_dir);

    let again = mirror_once(thread("Test"), THREAD_URL, tmp.path());

    assert_eq!(again.stats.records_created, 0);
    assert_eq!(again.stats.records_changed, 0);
    assert_eq!(again.stats.records_marked, 0);
    assert_eq!(count(&again.post_dir.join("new")), 0);
    assert_eq!(count(&again.post_dir.join("cur")), 4);
}

#[test]
fn test_edit_moves_record_back_to_new() {
    let tmp = TempDir::new().unwrap();
    let report = mirror_once(thread("Test"), THREAD_URL, tmp.path());
    read_all(&report.post_dir);

    let mut items = thread("Test");
    items[1].text = "Hi, edited".to_string();
    let again = mirror_once(items, THREAD_URL, tmp.path());

    assert_eq!(again.stats.records_changed, 1);
    assert_eq!(again.stats.records_marked, 1);
    assert_eq!(count(&again.post_dir.join("new")), 1);

    let records = records(&again.post_dir);
    assert_eq!(records.len(), 4);
    assert_eq!(find(&records, "<hackernews-2>").body(), "Hi, edited");
}

#[test]
fn test_post_dir_bookkeeping() {
    let tmp = TempDir::new().unwrap();
    let report = mirror_once(thread("Test"), THREAD_URL, tmp.path());

    let url = fs::read_to_string(report.post_dir.join(URL_FILE)).unwrap();
    assert_eq!(url, THREAD_URL);

    let snapshot = Snapshot::load(&report.post_dir.join("Test.json")).unwrap();
    assert_eq!(snapshot.url, THREAD_URL);
    assert_eq!(snapshot.items.len(), 4);
}

#[test]
fn test_rerun_from_directory() {
    let tmp = TempDir::new().unwrap();
    let report = mirror_once(thread("Test"), THREAD_URL, tmp.path());

    let arg = report.post_dir.to_str().unwrap().to_string();
    let again = mirror_once(thread("Test"), &arg, tmp.path());

    assert_eq!(again.post_dir, report.post_dir);
    assert_eq!(again.url, THREAD_URL);
    assert_eq!(again.stats.records_created, 0);
}

#[test]
fn test_title_change_renames_directory() {
    let tmp = TempDir::new().unwrap();
    let report = mirror_once(thread("Test"), THREAD_URL, tmp.path());

    let arg = report.post_dir.to_str().unwrap().to_string();
    let again = mirror_once(thread("Renamed post"), &arg, tmp.path());

    assert_eq!(again.post_dir, tmp.path().join("Renamed_post"));
    assert!(!report.post_dir.exists());
    assert_eq!(again.stats.records_created, 0);
    assert_eq!(records(&again.post_dir).len(), 4);
}

#[test]
fn test_title_change_conflict() {
    let tmp = TempDir::new().unwrap();
    let report = mirror_once(thread("Test"), THREAD_URL, tmp.path());
    fs::create_dir(tmp.path().join("Renamed_post")).unwrap();

    let mut session = Session::new(StaticSource::with_items(thread("Renamed post")));
    let err = mirror::run(
        &mut session,
        report.post_dir.to_str().unwrap(),
        &MirrorOptions::default(),
        |_, _| {},
    )
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<MirrorError>(),
        Some(MirrorError::Conflict { .. })
    ));
    assert!(report.post_dir.exists());
}

#[test]
fn test_explicit_output_dir_never_renamed() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("mine");

    let mut session = Session::new(StaticSource::with_items(thread("Test")));
    let options = MirrorOptions {
        output_dir: Some(out.clone()),
        ..Default::default()
    };
    let report = mirror::run(&mut session, THREAD_URL, &options, |_, _| {}).unwrap();

    assert_eq!(report.post_dir, out);
    assert_eq!(records(&out).len(), 4);
    assert!(out.join("mine.json").exists());
}

#[test]
fn test_replay_snapshot_offline() {
    let tmp = TempDir::new().unwrap();
    let first = tmp.path().join("first");
    let replay = tmp.path().join("replay");

    let mut session = Session::new(StaticSource::with_items(thread("Test")));
    let options = MirrorOptions {
        output_dir: Some(first.clone()),
        ..Default::default()
    };
    mirror::run(&mut session, THREAD_URL, &options, |_, _| {}).unwrap();

    // replay through an empty source: every item must come from the snapshot
    let snapshot = Snapshot::load(&first.join("first.json")).unwrap();
    let url = snapshot.url.clone();
    let mut session = Session::with_cache(StaticSource::new(), ItemCache::from(snapshot));
    let options = MirrorOptions {
        output_dir: Some(replay.clone()),
        ..Default::default()
    };
    let report = mirror::run(&mut session, &url, &options, |_, _| {}).unwrap();

    assert_eq!(report.stats.records_created, 4);
    assert_eq!(report.stats.fetch_errors, 0);
}

#[test]
fn test_progress_depths() {
    let tmp = TempDir::new().unwrap();
    let store = MaildirStore::open(tmp.path()).unwrap();
    let mut session = Session::new(StaticSource::with_items(thread("Test")));
    let root = session.fetch("1").unwrap();

    let mut markers = String::new();
    sync_thread(&mut session, &store, &root, &SyncOptions::default(), |depth, outcome| {
        markers.push_str(&" ".repeat(depth));
        markers.push(outcome.marker());
        markers.push('\n');
    })
    .unwrap();

    assert_eq!(markers, "+\n +\n +\n  +\n");
}

#[test]
fn test_dump_root_only() {
    let mut session = Session::new(StaticSource::with_items(thread("Test")));

    let json = mirror::dump(&mut session, THREAD_URL).unwrap();
    let item: HnItem = serde_json::from_str(&json).unwrap();

    assert_eq!(item.id, 1);
    assert_eq!(item.kids, vec![2, 3]);
    assert_eq!(session.cache().len(), 1);
}

#[test]
fn test_missing_root_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let mut session = Session::new(StaticSource::new());
    let options = MirrorOptions {
        base_dir: tmp.path().to_path_buf(),
        ..Default::default()
    };

    let err = mirror::run(&mut session, THREAD_URL, &options, |_, _| {}).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<MirrorError>(),
        Some(MirrorError::ItemNotFound(_))
    ));
    assert_eq!(count(tmp.path()), 0);
}

#[test]
fn test_stray_mail_without_message_id_aborts() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("out");
    let store = MaildirStore::open(&out).unwrap();
    store.deliver("Subject: not ours\n\nhello").unwrap();

    let mut session = Session::new(StaticSource::with_items(thread("Test")));
    let options = MirrorOptions {
        output_dir: Some(out.clone()),
        ..Default::default()
    };
    let err = mirror::run(&mut session, THREAD_URL, &options, |_, _| {}).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<MirrorError>(),
        Some(MirrorError::MissingMessageId(_))
    ));
}
