//! End-to-end integration tests for ccsessions
//!
//! These tests write session logs to disk, scan them through the store and
//! check the records and views that come out the other end.

mod common;

use ccsessions::{
    filters::{Collection, SessionFilter},
    output::{DisplayContext, get_formatter},
    store::SessionStore,
    timezone::TimezoneConfig,
};
use ccsessions_provider_claude::{DataLoader, ProjectResolver};
use chrono::Utc;
use chrono_tz::Tz;
use common::{SessionLogBuilder, TEST_HOME, recent, test_loader};
use filetime::FileTime;
use std::time::{Duration, SystemTime};

const SONNET: &str = "claude-sonnet-4-5-20250929";
const OPUS: &str = "claude-opus-4-6";

fn utc() -> TimezoneConfig {
    TimezoneConfig::new(Tz::UTC)
}

async fn loaded_store(loader: DataLoader, window: Duration) -> SessionStore {
    let mut store = SessionStore::new(loader, utc(), window);
    store.request_scan();
    store.wait_until_loaded().await;
    store
}

#[tokio::test]
async fn test_single_greeting_is_chat() {
    let (temp_dir, loader) = test_loader();
    SessionLogBuilder::new("greeting", recent(5))
        .user("Hello")
        .write(temp_dir.path(), "-Users-alice");

    let store = loaded_store(loader, Duration::ZERO).await;
    let session = store.find("greeting").unwrap();

    assert_eq!(session.project, "Chat");
    assert_eq!(session.title, "Hello");
    assert_eq!(session.summary, "Hello");
    assert_eq!(session.cwd, "~");
    assert_eq!(session.user_messages, 1);
    assert_eq!(session.assistant_messages, 0);
    assert_eq!(session.total_tokens(), 0);
    assert_eq!(session.estimated_cost, 0.0);
    assert!(session.model.is_empty());
}

#[tokio::test]
async fn test_full_session_record() {
    let (temp_dir, loader) = test_loader();
    let path = SessionLogBuilder::new("atlas-1", recent(30))
        .cwd("/Users/alice/Projects/atlas")
        .branch("feature/search")
        .user("<system-reminder>\nignore me\n</system-reminder># Add search endpoint\nwith paging")
        .assistant(SONNET, 1_000_000, 0, "Looking at the router")
        .tool_call(SONNET, "Read", "/Users/alice/Projects/atlas/src/router.rs")
        .tool_call(SONNET, "Edit", "/Users/alice/Projects/atlas/src/search.rs")
        .assistant(SONNET, 0, 100_000, "Done")
        .turn_duration(90_000)
        .user("now add tests")
        .turn_duration(30_000)
        .write(temp_dir.path(), "-Users-alice-Projects-atlas");

    let store = loaded_store(loader, Duration::ZERO).await;
    let session = store.get("atlas-1").unwrap();

    assert_eq!(session.project, "atlas");
    assert_eq!(session.title, "Add search endpoint");
    assert!(session.summary.starts_with("# Add search endpoint\nwith paging → "));
    assert!(session.summary.ends_with(" → now add tests"));
    assert!(!session.summary.contains("ignore me"));
    assert_eq!(session.cwd, "/Users/alice/Projects/atlas");
    assert_eq!(session.git_branch, "feature/search");
    assert_eq!(session.user_messages, 2);
    assert_eq!(session.assistant_messages, 4);
    assert_eq!(session.tokens.input_tokens, 1_000_000);
    assert_eq!(session.tokens.output_tokens, 100_000);
    assert_eq!(session.tool_counts.get("Read"), Some(&1));
    assert_eq!(session.tool_counts.get("Edit"), Some(&1));
    assert_eq!(session.model.as_str(), SONNET);
    assert_eq!(session.duration_ms, 120_000);
    assert!((session.estimated_cost - 4.5).abs() < 1e-9);
    assert_eq!(session.size_bytes, std::fs::metadata(path).unwrap().len());
}

#[tokio::test]
async fn test_tool_paths_outvote_working_directory() {
    let (temp_dir, loader) = test_loader();
    SessionLogBuilder::new("moved", recent(10))
        .cwd("/Users/alice/Projects/atlas")
        .user("fix the garden build")
        .tool_call(OPUS, "Read", "/Users/alice/Projects/garden/Cargo.toml")
        .tool_call(OPUS, "Edit", "/Users/alice/Projects/garden/src/main.rs")
        .write(temp_dir.path(), "-Users-alice-Projects-atlas");

    let store = loaded_store(loader, Duration::ZERO).await;
    assert_eq!(store.get("moved").unwrap().project, "garden");
}

#[tokio::test]
async fn test_repository_url_in_messages() {
    let (temp_dir, loader) = test_loader();
    SessionLogBuilder::new("from-url", recent(10))
        .cwd(TEST_HOME)
        .user("please review https://github.com/alice/weather-station/pull/12")
        .assistant(OPUS, 200_000, 40_000, "Sure")
        .write(temp_dir.path(), "-Users-alice");

    let store = loaded_store(loader, Duration::ZERO).await;
    let session = store.get("from-url").unwrap();
    assert_eq!(session.project, "weather-station");
    assert!((session.estimated_cost - 2.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_home_fallback_with_tools() {
    let (temp_dir, loader) = test_loader();
    SessionLogBuilder::new("errand", recent(10))
        .cwd(TEST_HOME)
        .user("what is in my downloads")
        .tool_call(SONNET, "Bash", "/tmp/listing.txt")
        .write(temp_dir.path(), "-Users-alice");

    let store = loaded_store(loader, Duration::ZERO).await;
    assert_eq!(store.get("errand").unwrap().project, "Home");
}

#[tokio::test]
async fn test_malformed_and_unknown_lines_are_skipped() {
    let (temp_dir, loader) = test_loader();
    SessionLogBuilder::new("noisy", recent(10))
        .raw("{not json")
        .raw(r#"{"type":"file-history-snapshot","snapshot":{}}"#)
        .user("Refactor the scheduler")
        .raw("")
        .raw(r#"{"type":"assistant","message":{"usage":{"input_tokens":"many"}}}"#)
        .write(temp_dir.path(), "-Users-alice-Projects-scheduler");

    let store = loaded_store(loader, Duration::ZERO).await;
    let session = store.get("noisy").unwrap();
    assert_eq!(session.title, "Refactor the scheduler");
    assert_eq!(session.assistant_messages, 1);
    assert_eq!(session.total_tokens(), 0);
    assert_eq!(session.project, "scheduler");
}

#[tokio::test]
async fn test_log_without_timestamp_is_dropped() {
    let (temp_dir, loader) = test_loader();
    SessionLogBuilder::new("timeless", recent(10))
        .raw(r#"{"type":"user","message":{"content":"no clock here"}}"#)
        .write(temp_dir.path(), "-Users-alice-Projects-atlas");
    SessionLogBuilder::new("kept", recent(10))
        .user("hi")
        .write(temp_dir.path(), "-Users-alice-Projects-atlas");

    let store = loaded_store(loader, Duration::ZERO).await;
    assert!(store.find("timeless").is_none());
    assert!(store.find("kept").is_some());
}

#[tokio::test]
async fn test_recency_window() {
    let (temp_dir, loader) = test_loader();
    let old_path = SessionLogBuilder::new("old", recent(60 * 24 * 10))
        .user("ancient history")
        .write(temp_dir.path(), "-Users-alice-Projects-atlas");
    let ten_days_ago = SystemTime::now() - Duration::from_secs(10 * 86_400);
    filetime::set_file_mtime(&old_path, FileTime::from_system_time(ten_days_ago)).unwrap();

    // Fresh mtime but an old first timestamp
    SessionLogBuilder::new("touched", recent(60 * 24 * 10))
        .user("reopened")
        .write(temp_dir.path(), "-Users-alice-Projects-atlas");

    SessionLogBuilder::new("new", recent(5))
        .user("fresh work")
        .write(temp_dir.path(), "-Users-alice-Projects-atlas");

    let mut store = loaded_store(loader, Duration::from_secs(7 * 86_400)).await;
    let ids: Vec<_> = store.sessions().iter().map(|s| s.id.to_string()).collect();
    assert_eq!(ids, vec!["new"]);

    store.scan_all();
    store.wait_until_loaded().await;
    assert!(store.window().is_zero());
    assert_eq!(store.sessions().len(), 3);
}

#[tokio::test]
async fn test_sessions_sorted_newest_first() {
    let (temp_dir, loader) = test_loader();
    for (id, minutes) in [("b", 20), ("a", 5), ("c", 40)] {
        SessionLogBuilder::new(id, recent(minutes))
            .user(id)
            .write(temp_dir.path(), "-Users-alice-Projects-atlas");
    }

    let store = loaded_store(loader, Duration::ZERO).await;
    let ids: Vec<_> = store.sessions().iter().map(|s| s.id.to_string()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_rescan_replaces_collection() {
    let (temp_dir, loader) = test_loader();
    let first = SessionLogBuilder::new("first", recent(10))
        .user("one")
        .write(temp_dir.path(), "-Users-alice-Projects-atlas");

    let mut store = loaded_store(loader, Duration::ZERO).await;
    assert_eq!(store.sessions().len(), 1);

    std::fs::remove_file(first).unwrap();
    SessionLogBuilder::new("second", recent(5))
        .user("two")
        .write(temp_dir.path(), "-Users-alice-Projects-garden");

    let before = store.sessions();
    store.rescan();
    assert!(store.is_loading());
    store.wait_until_loaded().await;

    assert_eq!(before.len(), 1);
    assert_eq!(before[0].id.as_str(), "first");
    let ids: Vec<_> = store.sessions().iter().map(|s| s.id.to_string()).collect();
    assert_eq!(ids, vec!["second"]);
}

#[tokio::test]
async fn test_missing_root_yields_empty_store() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let loader = DataLoader::new(
        temp_dir.path().join("does-not-exist"),
        ProjectResolver::new(TEST_HOME),
    );
    let store = loaded_store(loader, Duration::ZERO).await;
    assert!(store.sessions().is_empty());
    assert!(!store.is_loading());
}

#[tokio::test]
async fn test_views_and_output() {
    let (temp_dir, loader) = test_loader();
    SessionLogBuilder::new("big", recent(5))
        .cwd("/Users/alice/Projects/atlas")
        .user("index everything")
        .assistant(SONNET, 150_000, 1_000, "ok")
        .write(temp_dir.path(), "-Users-alice-Projects-atlas");
    SessionLogBuilder::new("small", recent(15))
        .cwd("/Users/alice/Projects/garden")
        .user("water the plants")
        .assistant(SONNET, 100, 10, "ok")
        .write(temp_dir.path(), "-Users-alice-Projects-garden");

    let store = loaded_store(loader, Duration::ZERO).await;
    let now = Utc::now();

    assert_eq!(store.projects(), vec!["atlas", "garden"]);
    assert_eq!(store.large_session_count(), 1);

    let large = SessionFilter::new().with_collection(Collection::LargeSessions);
    let ids: Vec<_> = store.filtered(&large, now).iter().map(|s| s.id.to_string()).collect();
    assert_eq!(ids, vec!["big"]);

    let search = SessionFilter::new().with_search("PLANTS");
    assert_eq!(store.filtered(&search, now).len(), 1);

    let ctx = DisplayContext::new(utc(), TEST_HOME, now);
    let sessions = store.filtered(&SessionFilter::new(), now);
    let output = get_formatter(true).format_sessions(&sessions, &ctx).unwrap();
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(json["sessions"][0]["id"], "big");
    assert_eq!(json["sessions"][1]["project"], "garden");

    let table = get_formatter(false)
        .format_session(store.get("big").unwrap(), &ctx)
        .unwrap();
    assert!(table.contains("~/Projects/atlas"));
    assert!(table.contains("claude --resume big"));
}
