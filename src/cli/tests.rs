//! Tests for cli module

use super::*;
use crate::config::StoreConfig;
use crate::fetch::{Fetcher, RetryConfig};
use crate::hooks::Action;
use clap::Parser;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::io::Write;

const FIXTURE: &str = r#"
pages:
  0: { items: [a, b], next: 1 }
  1: { items: [c], next: 2 }
  2: { items: [d] }
"#;

fn fixture(yaml: &str) -> Fixture {
    Fixture::from_yaml_str(yaml).unwrap()
}

// ============================================================================
// Argument Tests
// ============================================================================

#[test]
fn test_cli_parses_replay_actions() {
    let cli = Cli::try_parse_from([
        "pagestore",
        "replay",
        "--fixture",
        "pages.yaml",
        "--actions",
        "load,more,refresh,retry",
    ])
    .unwrap();

    assert_eq!(cli.format, OutputFormat::Json);
    assert!(!cli.verbose);
    match cli.command {
        Commands::Replay { actions } => assert_eq!(
            actions,
            vec![
                Action::LoadInitial,
                Action::LoadMore,
                Action::Refresh,
                Action::Retry
            ]
        ),
        Commands::Walk { .. } => panic!("expected replay"),
    }
}

#[test]
fn test_cli_rejects_unknown_action() {
    let result = Cli::try_parse_from(["pagestore", "replay", "--actions", "load,jump"]);
    assert!(result.is_err());
}

#[test]
fn test_cli_parses_walk_with_globals() {
    let cli = Cli::try_parse_from([
        "pagestore",
        "walk",
        "-f",
        "pages.json",
        "--format",
        "pretty",
        "-v",
        "--max-pages",
        "3",
    ])
    .unwrap();

    assert_eq!(cli.format, OutputFormat::Pretty);
    assert!(cli.verbose);
    assert!(matches!(cli.command, Commands::Walk { max_pages: 3 }));
}

// ============================================================================
// Fixture Tests
// ============================================================================

#[test]
fn test_fixture_yaml_defaults() {
    let fixture = fixture(FIXTURE);

    assert_eq!(fixture.initial_cursor(), "0");
    assert_eq!(fixture.delay_ms, 0);
    assert_eq!(
        fixture.page("0", 0),
        Some(&FixturePage::Page {
            items: vec![json!("a"), json!("b")],
            next: Some(FixtureCursor("1".to_string())),
        })
    );
    assert!(fixture.page("9", 0).is_none());
}

#[test]
fn test_fixture_json() {
    let fixture = Fixture::from_json_str(
        r#"{"initial": "p1", "pages": {"p1": {"items": [1, 2], "next": null}}}"#,
    )
    .unwrap();

    assert_eq!(fixture.initial_cursor(), "p1");
    assert_eq!(
        fixture.page("p1", 0),
        Some(&FixturePage::Page {
            items: vec![json!(1), json!(2)],
            next: None,
        })
    );
}

#[test]
fn test_fixture_sequence_repeats_last() {
    let fixture = fixture(
        r#"
pages:
  0:
    - { error: "boom", transient: true }
    - { items: [x] }
"#,
    );

    assert_eq!(
        fixture.page("0", 0),
        Some(&FixturePage::Error {
            error: "boom".to_string(),
            transient: true,
        })
    );
    assert!(matches!(fixture.page("0", 1), Some(FixturePage::Page { .. })));
    assert_eq!(fixture.page("0", 5), fixture.page("0", 1));
}

#[test]
fn test_fixture_from_file() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(FIXTURE.as_bytes()).unwrap();

    let loaded = Fixture::from_file(file.path()).unwrap();
    assert_eq!(loaded, fixture(FIXTURE));
}

#[test]
fn test_fixture_missing_file() {
    let result = Fixture::from_file("/nonexistent/pages.yaml");
    assert!(matches!(result, Err(crate::Error::FileNotFound { .. })));
}

#[tokio::test]
async fn test_fixture_fetcher_serves_pages_and_errors() {
    let fetcher = FixtureFetcher::new(fixture(
        r#"
pages:
  0: { items: [a], next: "1" }
  1: [{ error: "flaky", transient: true }, { error: "gone" }]
"#,
    ));

    let page = fetcher.fetch_page("0".to_string()).await.unwrap();
    assert_eq!(page.items, vec![json!("a")]);
    assert_eq!(page.next_cursor.as_deref(), Some("1"));

    let first = fetcher.fetch_page("1".to_string()).await.unwrap_err();
    assert_eq!(first.message(), "flaky");
    assert!(first.is_retryable());

    let second = fetcher.fetch_page("1".to_string()).await.unwrap_err();
    assert_eq!(second.message(), "gone");
    assert!(!second.is_retryable());
    assert_eq!(fetcher.attempts("1"), 2);

    let missing = fetcher.fetch_page("7".to_string()).await.unwrap_err();
    assert!(missing.message().contains("'7'"));
}

// ============================================================================
// Runner Tests
// ============================================================================

#[tokio::test]
async fn test_replay_reports_each_action() {
    let lines = replay(
        &fixture(FIXTURE),
        &StoreConfig::default(),
        &[Action::LoadInitial, Action::LoadMore, Action::LoadMore, Action::LoadMore],
    )
    .await
    .unwrap();

    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0]["action"], "load");
    assert_eq!(lines[0]["viewState"], "loaded");
    assert_eq!(lines[0]["items"], json!(["a", "b"]));
    assert_eq!(lines[1]["items"], json!(["a", "b", "c"]));
    assert_eq!(lines[1]["currentCursor"], "1");
    assert_eq!(lines[2]["loadMoreState"], "noMoreData");
    assert_eq!(lines[2]["nextCursor"], Value::Null);
    // Exhausted: the last load-more is ignored
    assert_eq!(lines[3]["items"], lines[2]["items"]);
    assert_eq!(lines[3]["generation"], lines[2]["generation"]);
}

#[tokio::test]
async fn test_replay_refresh_failure_keeps_items() {
    let fixture = fixture(
        r#"
pages:
  0: [{ items: [a], next: 1 }, { error: "server error" }]
"#,
    );

    let lines = replay(
        &fixture,
        &StoreConfig::default(),
        &[Action::LoadInitial, Action::Refresh],
    )
    .await
    .unwrap();

    assert_eq!(lines[1]["viewState"], "loaded");
    assert_eq!(lines[1]["items"], json!(["a"]));
    assert_eq!(lines[1]["isRefreshing"], false);
    assert_eq!(lines[1]["error"], Value::Null);
}

#[tokio::test]
async fn test_replay_retry_after_failure() {
    let fixture = fixture(
        r#"
pages:
  0: [{ error: "offline" }, { items: [] }]
"#,
    );

    let lines = replay(
        &fixture,
        &StoreConfig::default(),
        &[Action::LoadInitial, Action::Retry],
    )
    .await
    .unwrap();

    assert_eq!(lines[0]["viewState"], "failed");
    assert_eq!(lines[0]["error"], "offline");
    assert_eq!(lines[1]["viewState"], "empty");
    assert_eq!(lines[1]["loadMoreState"], "noMoreData");
}

#[tokio::test]
async fn test_walk_collects_all_pages() {
    let report = walk(&fixture(FIXTURE), &StoreConfig::default(), 100)
        .await
        .unwrap();

    assert_eq!(report["items"], json!(["a", "b", "c", "d"]));
    assert_eq!(report["pages"], 3);
    assert_eq!(report["complete"], true);
    assert_eq!(report["stats"]["pagesFetched"], 3);
    assert_eq!(report["stats"]["itemsLoaded"], 4);
}

#[tokio::test]
async fn test_walk_respects_max_pages() {
    let report = walk(&fixture(FIXTURE), &StoreConfig::default(), 2)
        .await
        .unwrap();

    assert_eq!(report["items"], json!(["a", "b", "c"]));
    assert_eq!(report["complete"], false);
}

#[tokio::test]
async fn test_walk_stops_at_failed_load_more() {
    let fixture = fixture(
        r#"
pages:
  0: { items: [a], next: 1 }
  1: { error: "gone" }
"#,
    );

    let report = walk(&fixture, &StoreConfig::default(), 100).await.unwrap();
    assert_eq!(report["items"], json!(["a"]));
    assert_eq!(report["loadMoreState"], "failed");
    assert_eq!(report["stats"]["failures"], 1);
}

#[tokio::test]
async fn test_walk_fails_on_initial_error() {
    let fixture = fixture("pages: { 0: { error: offline } }");
    let result = walk(&fixture, &StoreConfig::default(), 100).await;
    assert!(matches!(result, Err(crate::Error::Fetch(_))));
}

#[tokio::test(start_paused = true)]
async fn test_walk_with_retry_config() {
    let fixture = fixture(
        r#"
pages:
  0: [{ error: "busy", transient: true }, { items: [a] }]
"#,
    );
    let config = StoreConfig::new().with_retry(RetryConfig::new(1));

    let report = walk(&fixture, &config, 100).await.unwrap();
    assert_eq!(report["items"], json!(["a"]));
    assert_eq!(report["stats"]["failures"], 0);
}
