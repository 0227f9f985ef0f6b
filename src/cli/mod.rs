//! CLI module
//!
//! Command-line interface for driving a store against a fixture.
//!
//! # Commands
//!
//! - `replay` - Run a list of actions and print the snapshot after each one
//! - `walk` - Load every page of a fixture and print the items

mod commands;
mod fixture;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use fixture::{Fixture, FixtureCursor, FixtureEntry, FixtureFetcher, FixturePage};
pub use runner::{build_store, replay, snapshot_to_json, stats_to_json, walk, Runner};

#[cfg(test)]
mod tests;
