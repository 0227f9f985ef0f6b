//! CLI tests against fixture files on disk

use clap::Parser;
use pagestore::cli::{replay, walk, Cli, Fixture, Runner};
use pagestore::hooks::Action;
use pagestore::{Error, StoreConfig};
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;
use tokio_test::{assert_err, assert_ok};

fn write_file(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

const FEED: &str = r#"
initial: start
delay_ms: 5
pages:
  start: { items: [{ id: 1 }, { id: 2 }], next: page-2 }
  page-2:
    - { error: "502 bad gateway", transient: true }
    - { items: [{ id: 3 }], next: null }
"#;

#[tokio::test]
async fn test_replay_from_files() {
    let fixture = write_file(".yaml", FEED);
    let config = write_file(".json", r#"{"name": "feed", "timeout_ms": 1000}"#);

    let fixture = Fixture::from_file(fixture.path()).unwrap();
    let config = StoreConfig::from_file(config.path()).unwrap();
    let lines = replay(
        &fixture,
        &config,
        &[Action::LoadInitial, Action::LoadMore, Action::Retry],
    )
    .await
    .unwrap();

    assert_eq!(lines[0]["items"], json!([{ "id": 1 }, { "id": 2 }]));
    assert_eq!(lines[1]["loadMoreState"], "failed");
    assert_eq!(lines[1]["viewState"], "loaded");
    assert_eq!(lines[2]["items"].as_array().map(Vec::len), Some(3));
    assert_eq!(lines[2]["loadMoreState"], "noMoreData");
}

#[tokio::test]
async fn test_walk_with_retrying_config() {
    let fixture = Fixture::from_yaml_str(FEED).unwrap();
    let config = StoreConfig::from_yaml_str(
        r"
name: feed
retry:
  max_retries: 2
  initial_backoff_ms: 1
  retry_all: true
",
    )
    .unwrap();

    let report = walk(&fixture, &config, 10).await.unwrap();
    assert_eq!(report["items"], json!([{ "id": 1 }, { "id": 2 }, { "id": 3 }]));
    assert_eq!(report["complete"], true);
}

#[tokio::test]
async fn test_runner_executes_replay() {
    let fixture = write_file(".yaml", FEED);
    let path = fixture.path().to_string_lossy().to_string();
    let cli = Cli::try_parse_from([
        "pagestore",
        "replay",
        "--fixture",
        path.as_str(),
        "--actions",
        "load,refresh",
    ])
    .unwrap();

    assert_ok!(Runner::new(cli).run().await);
}

#[tokio::test]
async fn test_runner_requires_fixture() {
    let cli = Cli::try_parse_from(["pagestore", "walk"]).unwrap();
    let result = Runner::new(cli).run().await;
    assert!(matches!(result, Err(Error::Config { .. })));
}

#[tokio::test]
async fn test_runner_rejects_invalid_config() {
    let fixture = write_file(".yaml", FEED);
    let config = write_file(".yaml", "name: feed\ntimeout_ms: 0\n");
    let fixture_path = fixture.path().to_string_lossy().to_string();
    let config_path = config.path().to_string_lossy().to_string();

    let cli = Cli::try_parse_from([
        "pagestore",
        "walk",
        "-f",
        fixture_path.as_str(),
        "-C",
        config_path.as_str(),
    ])
    .unwrap();

    assert_err!(Runner::new(cli).run().await);
}
