//! # leadharvest
//!
//! Collects business leads from a map-search results feed into a CSV file.
//!
//! ## Architecture
//!
//! ```text
//! FeedPaginator → Driver → FieldExtractor → DedupIndex → CsvLeadWriter
//! ```
//!
//! A run is append-only: leads whose address is already in the output file
//! are skipped, so re-running a search only adds new businesses.
//!
//! ## Quick Start
//!
//! ```bash
//! leadharvest scrape -k "Med Spa" -l "Austin, TX" -c USA -n 25
//! leadharvest inspect scraped_leads/leads.csv
//! ```

/// Error types.
pub mod app;

/// Command-line interface using clap.
///
/// - `scrape` - Run a scrape session
/// - `inspect <path>` - Count unique addresses in an output file
pub mod cli;

/// Configuration loaded from `~/.config/leadharvest/config.toml`.
pub mod config;

/// Lead records and the output column catalogue.
pub mod domain;

/// Deduplication index and CSV persistence.
///
/// - [`DedupIndex`](store::DedupIndex): addresses already collected
/// - [`CsvLeadWriter`](store::CsvLeadWriter): append-only output with a single header row
pub mod store;

/// Browser-driven scrape session engine.
///
/// - [`ScrapeSession`](scraper::ScrapeSession): runs one session end to end
/// - [`FeedPaginator`](scraper::FeedPaginator): results feed state machine
/// - [`FieldExtractor`](scraper::FieldExtractor): per-listing field extraction
/// - [`PacingPolicy`](scraper::PacingPolicy): randomized delays
/// - [`ChromeLauncher`](scraper::ChromeLauncher): chromiumoxide-backed driver
pub mod scraper;
