//! Query analysis: turns raw search-box text into a [`QueryInfo`].
//!
//! Only two things are understood about a query: an embedded release year
//! (1900-2099) and its whitespace-separated words.

use crate::interface::QueryInfo;
use once_cell::sync::Lazy;
use regex::Regex;

/// First four-digit year in 1900-2099, matched anywhere in the text.
static YEAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:19|20)\d{2}").expect("valid year pattern"));

/// Fragments shorter than this (in chars) are dropped from `tokens`.
pub(crate) const MIN_TOKEN_CHARS: usize = 2;

/// Analyze a raw query. Never fails: empty input yields empty fields.
#[uniffi::export]
pub fn analyze_query(raw_query: String) -> QueryInfo {
    analyze(&raw_query)
}

pub fn analyze(raw_query: &str) -> QueryInfo {
    let mut working = raw_query.trim().to_lowercase();

    let found = YEAR_PATTERN
        .find(&working)
        .map(|m| (m.range(), m.as_str().parse::<i32>().ok()));

    let mut year = None;
    if let Some((range, parsed)) = found {
        working.replace_range(range, "");
        year = parsed;
    }

    let tokens = tokenize(&working);
    let clean_text = tokens.join(" ");

    QueryInfo {
        raw: raw_query.to_string(),
        clean_text,
        year,
        tokens,
    }
}

/// Split on whitespace and keep fragments of at least [`MIN_TOKEN_CHARS`] chars.
/// Input is expected to be lower-cased already.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter(|word| word.chars().count() >= MIN_TOKEN_CHARS)
        .map(str::to_string)
        .collect()
}

/// Lower-cased, trimmed form of the raw query: the title-matching text when
/// the analyzed `clean_text` ends up empty (e.g. a query that is only a year).
pub(crate) fn normalized_raw(info: &QueryInfo) -> String {
    info.raw.trim().to_lowercase()
}

/// Text used to compare a query against titles.
pub(crate) fn match_text(info: &QueryInfo) -> String {
    if info.clean_text.is_empty() {
        normalized_raw(info)
    } else {
        info.clean_text.clone()
    }
}
