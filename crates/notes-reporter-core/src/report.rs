//! Query shapes over the resolver and the plain-text report format.
//!
//! Area queries always filter first and count second: the resolver returns
//! the area's matches, and only then is the requested count applied.

use tracing::warn;

use crate::models::Entry;
use crate::resolver::{ResolveError, Resolver};

/// One report request: an optional area code and an optional count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportQuery {
    pub area: Option<String>,
    pub limit: Option<usize>,
}

impl ReportQuery {
    pub fn latest(limit: Option<usize>) -> Self {
        Self { area: None, limit }
    }

    pub fn area(area: impl Into<String>, limit: Option<usize>) -> Self {
        Self {
            area: Some(area.into()),
            limit,
        }
    }
}

/// Run `query` against the resolver and return the selected entries.
pub async fn select(resolver: &Resolver, query: &ReportQuery) -> Result<Vec<Entry>, ResolveError> {
    match &query.area {
        Some(area) => {
            let matches = resolver.get_entries_in_area(area).await?;
            Ok(limit_area(matches, area, query.limit))
        }
        None => resolver.get_entries(query.limit).await,
    }
}

/// Truncate area matches to `limit`, warning when fewer matched.
pub fn limit_area(mut entries: Vec<Entry>, area: &str, limit: Option<usize>) -> Vec<Entry> {
    if let Some(n) = limit {
        if n > entries.len() {
            warn!(
                "Asking to display {} results, but only {} results with {} area code were found.",
                n,
                entries.len(),
                area
            );
        }
        entries.truncate(n);
    }
    entries
}

/// Render entries as the plain-text report body.
pub fn render(entries: &[Entry]) -> String {
    let mut out = format!("Showing a total of {} results.\n", entries.len());
    for e in entries {
        out.push_str(&format!("[{}, {}, {}]\n", e.identifier, e.metric, e.note));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::CapturedLogs;

    fn entries(n: usize) -> Vec<Entry> {
        (0..n)
            .map(|i| Entry::new(format!("212-{}", i), i as u64, "x"))
            .collect()
    }

    #[test]
    fn render_header_and_lines() {
        let body = render(&[
            Entry::new("212-555-0100", 12, "Said \"IRS\""),
            Entry::new("415-555-0199", 0, ""),
        ]);
        assert_eq!(
            body,
            "Showing a total of 2 results.\n[212-555-0100, 12, Said \"IRS\"]\n[415-555-0199, 0, ]\n"
        );
    }

    #[test]
    fn render_empty() {
        assert_eq!(render(&[]), "Showing a total of 0 results.\n");
    }

    #[test]
    fn limit_area_truncates() {
        let (logs, _guard) = CapturedLogs::install();
        assert_eq!(limit_area(entries(5), "212", Some(2)).len(), 2);
        assert_eq!(limit_area(entries(5), "212", Some(5)).len(), 5);
        assert_eq!(limit_area(entries(5), "212", None).len(), 5);
        assert!(logs.warnings().is_empty(), "{}", logs.text());
    }

    #[test]
    fn limit_area_short_keeps_everything() {
        let (logs, _guard) = CapturedLogs::install();
        assert_eq!(limit_area(entries(2), "212", Some(10)).len(), 2);

        let warnings = logs.warnings();
        assert_eq!(warnings.len(), 1, "{}", logs.text());
        assert!(warnings[0]
            .contains("Asking to display 10 results, but only 2 results with 212 area code were found."));
    }
}
