//! Fixture-backed fetcher
//!
//! A fixture maps cursors to canned pages or failures:
//!
//! ```yaml
//! initial: "0"
//! delay_ms: 50
//! pages:
//!   0: { items: [a, b], next: 1 }
//!   1:
//!     - { error: "server error", transient: true }
//!     - { items: [c], next: null }
//! ```
//!
//! A list of entries is served in order, one per fetch of that cursor, and
//! the last entry repeats once the list runs out.

use crate::error::{Error, FetchError, Result, ResultExt};
use crate::fetch::Fetcher;
use crate::types::PageResult;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;

/// Cursor as written in a fixture; numbers and strings are both accepted
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "RawCursor")]
pub struct FixtureCursor(pub String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCursor {
    Text(String),
    Integer(i64),
    Float(f64),
    Flag(bool),
}

impl From<RawCursor> for FixtureCursor {
    fn from(raw: RawCursor) -> Self {
        Self(match raw {
            RawCursor::Text(s) => s,
            RawCursor::Integer(n) => n.to_string(),
            RawCursor::Float(n) => n.to_string(),
            RawCursor::Flag(b) => b.to_string(),
        })
    }
}

impl fmt::Display for FixtureCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One canned response
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FixturePage {
    /// The fetch fails with `error`
    Error {
        error: String,
        #[serde(default)]
        transient: bool,
    },
    /// The fetch returns `items` and `next`
    Page {
        #[serde(default)]
        items: Vec<Value>,
        #[serde(default)]
        next: Option<FixtureCursor>,
    },
}

/// Responses for one cursor
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FixtureEntry {
    Sequence(Vec<FixturePage>),
    Single(FixturePage),
}

impl FixtureEntry {
    /// Response for the `attempt`-th fetch (zero based)
    pub fn page(&self, attempt: usize) -> Option<&FixturePage> {
        match self {
            Self::Single(page) => Some(page),
            Self::Sequence(pages) => pages.get(attempt).or_else(|| pages.last()),
        }
    }
}

/// A set of canned pages
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Fixture {
    /// Cursor of the first page
    #[serde(default = "default_initial")]
    pub initial: FixtureCursor,

    /// Simulated latency per fetch
    #[serde(default)]
    pub delay_ms: u64,

    /// Responses keyed by cursor
    pub pages: HashMap<FixtureCursor, FixtureEntry>,
}

fn default_initial() -> FixtureCursor {
    FixtureCursor("0".to_string())
}

impl Fixture {
    /// Parse a fixture from YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse a fixture from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a fixture file; `.json` files are parsed as JSON, anything else as YAML
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let fixture = if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_yaml_str(&contents)
        };
        fixture.with_context(|| format!("Invalid fixture {}", path.display()))
    }

    /// Initial cursor as a plain string
    pub fn initial_cursor(&self) -> String {
        self.initial.0.clone()
    }

    /// Response for the `attempt`-th fetch of `cursor`
    pub fn page(&self, cursor: &str, attempt: usize) -> Option<&FixturePage> {
        self.pages
            .get(&FixtureCursor(cursor.to_string()))
            .and_then(|entry| entry.page(attempt))
    }
}

/// Fetcher serving pages from a [`Fixture`]
pub struct FixtureFetcher {
    fixture: Arc<Fixture>,
    attempts: Mutex<HashMap<String, usize>>,
}

impl FixtureFetcher {
    /// Create a fetcher over `fixture`
    pub fn new(fixture: Fixture) -> Self {
        Self {
            fixture: Arc::new(fixture),
            attempts: Mutex::new(HashMap::new()),
        }
    }

    /// Number of fetches made for `cursor` so far
    pub fn attempts(&self, cursor: &str) -> usize {
        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(cursor)
            .copied()
            .unwrap_or(0)
    }

    fn next_attempt(&self, cursor: &str) -> usize {
        let mut attempts = self.attempts.lock().unwrap_or_else(PoisonError::into_inner);
        let count = attempts.entry(cursor.to_string()).or_insert(0);
        let attempt = *count;
        *count += 1;
        attempt
    }
}

#[async_trait]
impl Fetcher<Value, String> for FixtureFetcher {
    async fn fetch_page(
        &self,
        cursor: String,
    ) -> std::result::Result<PageResult<Value, String>, FetchError> {
        let attempt = self.next_attempt(&cursor);
        debug!("Fixture fetch of '{}' (attempt {})", cursor, attempt + 1);

        if self.fixture.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.fixture.delay_ms)).await;
        }

        match self.fixture.page(&cursor, attempt) {
            Some(FixturePage::Page { items, next }) => Ok(PageResult::new(
                items.clone(),
                next.as_ref().map(ToString::to_string),
            )),
            Some(FixturePage::Error { error, transient }) => {
                Err(FetchError::new(error.clone()).with_transient(*transient))
            }
            None => Err(FetchError::new(format!("No page for cursor '{cursor}'"))),
        }
    }
}
