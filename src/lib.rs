//! # Notes Reporter
//!
//! Scrapes the list of recently reported phone numbers from a single page,
//! keeps a durable SQLite copy, and answers "the N most recent reports" and
//! "the N most recent reports for an area code" over HTTP and the CLI.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   ┌──────────┐
//! │ Fetcher  │──▶│ Extractor │──▶│ Resolver │◀──▶ SQLite store
//! │ (HTTP)   │   │ (previews)│   │ (policy) │
//! └──────────┘   └───────────┘   └────┬─────┘
//!                                     │
//!                      ┌──────────────┤
//!                      ▼              ▼
//!                 ┌──────────┐  ┌──────────┐
//!                 │   CLI    │  │   HTTP   │
//!                 │ (notes)  │  │  (axum)  │
//!                 └──────────┘  └──────────┘
//! ```
//!
//! The resolver and the store trait live in `notes-reporter-core`; this crate
//! supplies the concrete collaborators.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`db`] | SQLite connection pool with WAL mode |
//! | [`migrate`] | Table creation and reset |
//! | [`sqlite_store`] | `Store` implementation over SQLite |
//! | [`fetch`] | HTTP fetcher with timeout |
//! | [`extract`] | 800notes previews extractor |
//! | [`app`] | Config → resolver wiring |
//! | [`server`] | HTTP report server (Axum) |
//! | [`query`] | One-shot CLI commands |
//! | [`logging`] | `tracing` subscriber setup |

pub mod app;
pub mod config;
pub mod db;
pub mod extract;
pub mod fetch;
pub mod logging;
pub mod migrate;
pub mod query;
pub mod server;
pub mod sqlite_store;

pub use notes_reporter_core::{models, report, resolver, store};
pub use notes_reporter_core::{Entry, RawEntry, Resolver};
