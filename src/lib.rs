//! # Weir
//!
//! A keyword-filtering RSS/Atom feed reader.
//!
//! ## Architecture
//!
//! Weir follows a pipeline architecture:
//!
//! ```text
//! Fetcher → Encoding → Parser → Store ─┬→ Filter → display
//!                                      └→ Retention
//! ```
//!
//! - [`fetcher`]: HTTP client returning raw bytes
//! - [`encoding`]: UTF-8 / Shift_JIS detection and decoding
//! - [`parser`]: RSS 1.0 / RSS 2.0 / Atom normalization into articles
//! - [`filter`]: block/allow rule evaluation at display time
//! - [`sync`]: sequential multi-feed refresh with retention pruning
//! - [`store`]: SQLite persistence layer
//!
//! ## Quick Start
//!
//! ```bash
//! # Subscribe to a feed
//! weir add https://blog.rust-lang.org/feed.xml
//!
//! # Fetch everything
//! weir sync
//!
//! # Hide articles mentioning a keyword
//! weir filter add FX
//!
//! # Read the survivors
//! weir list --articles
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together all components:
/// store, fetcher, services.
pub mod app;

/// Command-line interface using clap.
pub mod cli;

/// Core domain models.
///
/// - [`Feed`](domain::Feed): a subscription
/// - [`Article`](domain::Article): one normalized feed item
/// - [`FilterRule`](domain::FilterRule) / [`AllowKeyword`](domain::AllowKeyword):
///   the block and allow vocabulary
pub mod domain;

/// Charset detection and decoding for fetched documents.
pub mod encoding;

/// HTTP fetching.
///
/// - [`Fetcher`](fetcher::Fetcher): async trait returning raw bytes
/// - [`HttpFetcher`](fetcher::HttpFetcher): reqwest-based implementation
pub mod fetcher;

/// Rule evaluation deciding which articles are suppressed.
pub mod filter;

/// Feed parsing and normalization.
///
/// Converts RSS 1.0 (RDF), RSS 2.0, and Atom documents into
/// [`Article`](domain::Article) records.
pub mod parser;

/// Feed, filter, and allow-keyword services consumed by the CLI.
pub mod service;

/// Typed wrapper over the key-value settings table.
pub mod settings;

/// SQLite persistence layer.
///
/// - [`Store`](store::Store): trait defining storage operations
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
pub mod store;

/// Sequential multi-feed synchronization with retention pruning.
pub mod sync;
