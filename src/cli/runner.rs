//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::cli::fixture::{Fixture, FixtureFetcher};
use crate::config::StoreConfig;
use crate::error::{Error, FetchError, Result};
use crate::hooks::{Action, ObservedStore, TracingHooks};
use crate::state::{LoadMoreState, Snapshot, StoreStats};
use crate::store::PageStore;
use serde_json::{json, Value};
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let fixture = self.load_fixture()?;
        let config = self.load_config()?;

        match &self.cli.command {
            Commands::Replay { actions } => {
                for line in replay(&fixture, &config, actions).await? {
                    self.output_message(&line);
                }
            }
            Commands::Walk { max_pages } => {
                let report = walk(&fixture, &config, *max_pages).await?;
                self.output_message(&report);
            }
        }

        Ok(())
    }

    /// Load fixture file
    fn load_fixture(&self) -> Result<Fixture> {
        let path = self
            .cli
            .fixture
            .as_ref()
            .ok_or_else(|| Error::config("Fixture file not specified (use -f flag)"))?;
        Fixture::from_file(path)
    }

    /// Load store config, falling back to defaults
    fn load_config(&self) -> Result<StoreConfig> {
        match &self.cli.config {
            Some(path) => StoreConfig::from_file(path),
            None => Ok(StoreConfig::default()),
        }
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Build a store over `fixture` with the layers `config` asks for
pub fn build_store(fixture: &Fixture, config: &StoreConfig) -> Result<PageStore<Value, String>> {
    PageStore::with_config(
        fixture.initial_cursor(),
        FixtureFetcher::new(fixture.clone()),
        config,
    )
}

/// Run `actions` in order and return the settled snapshot after each one
pub async fn replay(fixture: &Fixture, config: &StoreConfig, actions: &[Action]) -> Result<Vec<Value>> {
    let store = build_store(fixture, config)?;
    let observed = ObservedStore::new(store.clone(), TracingHooks::new(config.name.clone()));

    let mut lines = Vec::with_capacity(actions.len());
    for &action in actions {
        action.apply(&observed);
        let snapshot = store.settled().await;

        let mut line = snapshot_to_json(&snapshot);
        line["action"] = json!(action.as_str());
        lines.push(line);
    }

    info!(
        "Replayed {} actions, {} pages fetched",
        actions.len(),
        store.stats().pages_fetched
    );
    Ok(lines)
}

/// Load the first page and then every following page, up to `max_pages`
///
/// A failed initial load is returned as an error; a failed load-more ends
/// the walk with the items gathered so far.
pub async fn walk(fixture: &Fixture, config: &StoreConfig, max_pages: usize) -> Result<Value> {
    let store = build_store(fixture, config)?;

    store.load_initial();
    let mut snapshot = store.settled().await;
    let mut pages = 1;

    while pages < max_pages
        && snapshot.view_state.is_loaded()
        && snapshot.load_more_state == LoadMoreState::Idle
        && snapshot.has_more()
    {
        store.load_more();
        snapshot = store.settled().await;
        pages += 1;
    }

    if let Some(err) = snapshot.error() {
        return Err(Error::Fetch(err.clone()));
    }

    info!("Walked {} pages, {} items", pages, snapshot.len());
    Ok(json!({
        "items": snapshot.items(),
        "pages": pages,
        "complete": snapshot.load_more_state == LoadMoreState::NoMoreData,
        "loadMoreState": snapshot.load_more_state.as_str(),
        "stats": stats_to_json(&store.stats()),
    }))
}

/// JSON view of a snapshot
pub fn snapshot_to_json(snapshot: &Snapshot<Value, String>) -> Value {
    json!({
        "generation": snapshot.generation,
        "viewState": snapshot.view_state.as_str(),
        "error": snapshot.error().map(FetchError::message),
        "items": snapshot.items(),
        "loadMoreState": snapshot.load_more_state.as_str(),
        "isRefreshing": snapshot.is_refreshing,
        "currentCursor": snapshot.current_cursor,
        "nextCursor": snapshot.next_cursor,
        "lastLoadedAt": snapshot.last_loaded_at.map(|t| t.to_rfc3339()),
    })
}

/// JSON view of store counters
pub fn stats_to_json(stats: &StoreStats) -> Value {
    json!({
        "pagesFetched": stats.pages_fetched,
        "itemsLoaded": stats.items_loaded,
        "failures": stats.failures,
        "staleDropped": stats.stale_dropped,
        "superseded": stats.superseded,
    })
}
