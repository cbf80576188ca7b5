//! Extraction of entries from 800notes "previews" markup.
//!
//! The page lists recent reports as
//!
//! ```html
//! <ul id="previews">
//!   <li class="oos_listItem">
//!     <div class="oos_previewSide">12</div>
//!     <div class="oos_previewMain">
//!       <div class="oos_previewHeader"><a href="...">212-555-0100</a></div>
//!       <div class="oos_previewBody">Said it was the IRS.</div>
//!     </div>
//!   </li>
//! </ul>
//! ```
//!
//! Tags and attributes are matched case-insensitively. Text is taken with
//! tags stripped, basic entities decoded, and whitespace collapsed. Items
//! come back in page order.

use anyhow::Result;
use thiserror::Error;

use notes_reporter_core::models::RawEntry;
use notes_reporter_core::resolver::Extractor;

const LIST_ID: &str = "previews";
const ITEM_CLASS: &str = "oos_listitem";
const COUNT_CLASS: &str = "oos_previewside";
const NUMBER_CLASS: &str = "oos_previewheader";
const COMMENT_CLASS: &str = "oos_previewbody";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("page has no <ul id=\"previews\"> list")]
    MissingList,
    #[error("list item {item} has no element with class {class}")]
    MissingField { item: usize, class: &'static str },
}

/// [`Extractor`] for the 800notes front page.
#[derive(Debug, Default, Clone, Copy)]
pub struct PreviewsExtractor;

impl Extractor for PreviewsExtractor {
    fn extract(&self, page: &[u8]) -> Result<Vec<RawEntry>> {
        let html = String::from_utf8_lossy(page);
        Ok(parse_previews(&html)?)
    }
}

/// Byte offsets of one element: `<tag ...>inner</tag>`.
#[derive(Debug, Clone, Copy)]
struct Span {
    inner_start: usize,
    inner_end: usize,
    end: usize,
}

pub fn parse_previews(html: &str) -> Result<Vec<RawEntry>, ExtractError> {
    // ASCII lowercasing keeps byte offsets aligned with `html`.
    let lc = html.to_ascii_lowercase();

    let list = next_element(&lc, 0, lc.len(), Some("ul"), |open| {
        attr_value(open, "id") == Some(LIST_ID)
    })
    .ok_or(ExtractError::MissingList)?;

    let mut entries = Vec::new();
    let mut pos = list.inner_start;
    while let Some(item) = next_element(&lc, pos, list.inner_end, Some("li"), |open| {
        has_class(open, ITEM_CLASS)
    }) {
        let index = entries.len();
        let field = |name: Option<&str>, class: &'static str| {
            next_element(&lc, item.inner_start, item.inner_end, name, |open| {
                has_class(open, class)
            })
            .map(|span| text_of(&html[span.inner_start..span.inner_end]))
            .ok_or(ExtractError::MissingField { item: index, class })
        };

        let metric = field(None, COUNT_CLASS)?;
        let identifier = field(None, NUMBER_CLASS)?;
        let note = field(Some("div"), COMMENT_CLASS)?;
        entries.push(RawEntry::new(identifier, metric, note));

        pos = item.end;
    }

    Ok(entries)
}

/// Find the first element in `lc[from..to]` with the given tag name (any tag
/// if `None`) whose lowercased open-tag text satisfies `pred`.
fn next_element(
    lc: &str,
    from: usize,
    to: usize,
    name: Option<&str>,
    pred: impl Fn(&str) -> bool,
) -> Option<Span> {
    let mut pos = from;
    while pos < to {
        let lt = lc[pos..to].find('<')? + pos;
        let gt = lc[lt..to].find('>')? + lt;
        let open = &lc[lt + 1..gt];
        pos = gt + 1;

        if open.starts_with('/') || open.starts_with('!') || open.starts_with('?') {
            continue;
        }
        let tag = open
            .split(|c: char| c.is_whitespace() || c == '/')
            .next()
            .unwrap_or("");
        if tag.is_empty() || name.is_some_and(|n| n != tag) || !pred(open) {
            continue;
        }

        let (close_start, close_end) = closing_tag(lc, tag, gt + 1, to)?;
        return Some(Span {
            inner_start: gt + 1,
            inner_end: close_start,
            end: close_end,
        });
    }
    None
}

/// Position of the `</tag>` matching an already-opened `tag`, honouring
/// nesting of the same tag name.
fn closing_tag(lc: &str, tag: &str, from: usize, to: usize) -> Option<(usize, usize)> {
    let open_pat = format!("<{}", tag);
    let close_pat = format!("</{}", tag);
    let mut depth = 1usize;
    let mut pos = from;

    loop {
        let close = find_tag(lc, &close_pat, pos, to)?;
        let mut scan = pos;
        while let Some(open) = find_tag(lc, &open_pat, scan, close) {
            depth += 1;
            scan = open + open_pat.len();
        }

        let close_end = lc[close..to].find('>')? + close + 1;
        depth -= 1;
        if depth == 0 {
            return Some((close, close_end));
        }
        pos = close_end;
    }
}

/// Find `pat` (e.g. `<li`) in `lc[from..to]` where it is followed by a tag
/// delimiter, so `<li` does not match `<link`.
fn find_tag(lc: &str, pat: &str, from: usize, to: usize) -> Option<usize> {
    let mut pos = from;
    while pos < to {
        let at = lc[pos..to].find(pat)? + pos;
        let next = lc[at + pat.len()..].chars().next();
        if matches!(next, Some(c) if c.is_whitespace() || c == '>' || c == '/') {
            return Some(at);
        }
        pos = at + pat.len();
    }
    None
}

/// Value of `attr` in an open-tag body such as `div class="a b" id=x`.
fn attr_value<'a>(open: &'a str, attr: &str) -> Option<&'a str> {
    let pat = format!("{}=", attr);
    let mut from = 0;
    while let Some(i) = open[from..].find(&pat) {
        let at = from + i;
        let value_start = at + pat.len();
        if open[..at].ends_with(char::is_whitespace) {
            let rest = &open[value_start..];
            return Some(match rest.chars().next() {
                Some(q @ ('"' | '\'')) => {
                    let body = &rest[1..];
                    &body[..body.find(q).unwrap_or(body.len())]
                }
                _ => &rest[..rest
                    .find(|c: char| c.is_whitespace() || c == '/')
                    .unwrap_or(rest.len())],
            });
        }
        from = value_start;
    }
    None
}

fn has_class(open: &str, class: &str) -> bool {
    attr_value(open, "class").is_some_and(|v| v.split_whitespace().any(|c| c == class))
}

/// Visible text of an HTML fragment.
fn text_of(fragment: &str) -> String {
    normalize_ws(&decode_entities(&strip_tags(fragment)))
}

fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => {
                in_tag = true;
                out.push(' ');
            }
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_entity(&tail[1..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}

fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
