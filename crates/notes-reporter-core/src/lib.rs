//! # Notes Reporter Core
//!
//! Runtime-agnostic logic for Notes Reporter: the entry model, the
//! [`store::Store`] abstraction, the [`resolver::Resolver`] that reconciles a
//! live page fetch with durable history, and the text report renderer.
//!
//! This crate contains no sqlx, axum, reqwest, or filesystem I/O. The
//! application crate plugs concrete fetchers, extractors, and stores into the
//! traits defined here.

pub mod models;
pub mod report;
pub mod resolver;
pub mod store;

#[cfg(test)]
mod test_support;

pub use models::{Entry, EntryError, RawEntry};
pub use resolver::{Extractor, Fetcher, ResolveError, Resolver, ResolverSettings};
pub use store::Store;
