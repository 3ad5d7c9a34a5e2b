//! # Liftoff
//!
//! A terminal reader for the Spaceflight News API.
//!
//! ## Architecture
//!
//! Every request follows the same path:
//!
//! ```text
//! NewsApi → Pipeline → FetchOutcome + SideSignals → browse state → CLI / TUI
//! ```
//!
//! - [`fetcher`]: HTTP transport and connectivity probing
//! - [`pipeline`]: Wraps each call with connectivity, loader and error handling
//! - [`browse`]: Pagination and the detail-view pager
//! - [`tui`]: Terminal user interface built with ratatui
//!
//! ## Quick Start
//!
//! ```bash
//! # Latest articles
//! liftoff list
//!
//! # Articles whose title mentions Artemis
//! liftoff list --search artemis
//!
//! # Prefer one news site
//! liftoff prefer SpaceNews
//!
//! # Launch TUI
//! liftoff tui
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the preference
/// store, the HTTP transport and the fetch pipeline.
pub mod app;

/// Browsing state: list pagination and the swipe pager.
pub mod browse;

/// Configuration management.
///
/// Loads from `~/.config/liftoff/config.toml`, supporting:
/// - API endpoint and timeouts
/// - Pipeline behaviour (progress, toasts, request sequencing)
/// - Custom colors (named or hex)
/// - Custom keybindings
pub mod config;

/// Command-line interface using clap.
///
/// - `list [--offset N] [--search TEXT]` - One page of articles
/// - `show <id>` - A single article
/// - `sites [--filter TEXT]` - Known news sites
/// - `prefer [SITE | --clear]` - Stored news-site preference
/// - `tui` - Launch the TUI
pub mod cli;

/// Core domain models.
///
/// - [`Article`](domain::Article) and [`ArticlesPage`](domain::ArticlesPage): API payloads
/// - [`FetchOutcome`](domain::FetchOutcome): Result of one pipeline run
/// - [`SideSignal`](domain::SideSignal): Loader, toast and session notifications
pub mod domain;

/// HTTP transport.
///
/// - [`NewsApi`](fetcher::NewsApi): Async trait over the API endpoints
/// - [`HttpFetcher`](fetcher::HttpFetcher): reqwest-based implementation
/// - [`Connectivity`](fetcher::Connectivity): Network availability check
pub mod fetcher;

/// The fetch pipeline and the repository built on it.
pub mod pipeline;

/// Key-value preference storage.
///
/// - [`PreferenceStore`](store::PreferenceStore): Trait defining storage operations
/// - [`SqlitePreferenceStore`](store::SqlitePreferenceStore): SQLite implementation
pub mod store;

/// Terminal user interface.
///
/// Three screens built with ratatui:
/// - Article list with search bar and news-site chips
/// - Article detail with a swipe pager
/// - News-site preference picker
pub mod tui;
