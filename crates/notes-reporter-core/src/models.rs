//! Core data models used throughout Notes Reporter.
//!
//! A [`RawEntry`] is what an extractor pulls off the page: three strings in
//! page order. Converting it into an [`Entry`] validates the identifier and
//! parses the report count.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Number of leading identifier characters that form the area code.
pub const AREA_CODE_LEN: usize = 3;

/// Largest report count an entry may carry. Stores keep counts as signed
/// 64-bit integers.
pub const MAX_METRIC: u64 = i64::MAX as u64;

/// Unvalidated record as it appears in the source markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub identifier: String,
    pub metric: String,
    pub note: String,
}

impl RawEntry {
    pub fn new(
        identifier: impl Into<String>,
        metric: impl Into<String>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            metric: metric.into(),
            note: note.into(),
        }
    }
}

/// A reported phone number with its report count and latest comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Phone number; primary key in the store.
    pub identifier: String,
    /// Number of reports filed against `identifier`.
    pub metric: u64,
    /// Free-text comment, unescaped.
    pub note: String,
    /// Set by the store at write time. `None` for freshly extracted entries.
    pub recorded_at: Option<DateTime<Utc>>,
}

/// Validation failure while turning a [`RawEntry`] into an [`Entry`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntryError {
    #[error("entry identifier is empty")]
    EmptyIdentifier,
    #[error("invalid report count for {identifier}: {text:?}")]
    InvalidMetric { identifier: String, text: String },
}

impl Entry {
    pub fn new(identifier: impl Into<String>, metric: u64, note: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            metric,
            note: note.into(),
            recorded_at: None,
        }
    }

    /// Returns `true` if the first [`AREA_CODE_LEN`] characters of the
    /// identifier equal `area`.
    pub fn in_area(&self, area: &str) -> bool {
        area_code(&self.identifier) == Some(area)
    }
}

/// Leading area code of an identifier, or `None` if it is too short.
pub fn area_code(identifier: &str) -> Option<&str> {
    let (i, c) = identifier.char_indices().nth(AREA_CODE_LEN - 1)?;
    Some(&identifier[..i + c.len_utf8()])
}

impl TryFrom<RawEntry> for Entry {
    type Error = EntryError;

    fn try_from(raw: RawEntry) -> Result<Self, Self::Error> {
        let identifier = raw.identifier.trim().to_string();
        if identifier.is_empty() {
            return Err(EntryError::EmptyIdentifier);
        }

        let digits: String = raw
            .metric
            .chars()
            .filter(|c| !c.is_whitespace() && *c != ',')
            .collect();
        let metric = digits
            .parse::<u64>()
            .ok()
            .filter(|m| *m <= MAX_METRIC)
            .ok_or_else(|| EntryError::InvalidMetric {
                identifier: identifier.clone(),
                text: raw.metric.clone(),
            })?;

        Ok(Entry::new(identifier, metric, raw.note.trim()))
    }
}
