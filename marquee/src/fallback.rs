//! Built-in suggestions shown when the remote source can't answer.

use crate::interface::{ResultKind, Suggestion};

/// Titles offered when a lookup fails, in display order.
pub const FALLBACK_TITLES: [&str; 5] = [
    "Inception",
    "La La Land",
    "The Godfather",
    "Avatar",
    "The Dark Knight",
];

/// Built-in titles whose text contains the query, case-insensitively.
///
/// A blank query gets nothing. Label and navigation query are both the bare
/// title.
pub fn fallback_suggestions(query: &str) -> Vec<Suggestion> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    FALLBACK_TITLES
        .iter()
        .filter(|title| title.to_lowercase().contains(&needle))
        .map(|title| Suggestion {
            kind: ResultKind::Movie,
            label: title.to_string(),
            search_query: title.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(query: &str) -> Vec<String> {
        fallback_suggestions(query).into_iter().map(|s| s.label).collect()
    }

    #[test]
    fn test_substring_match_is_case_insensitive() {
        assert_eq!(labels("GODFATHER"), vec!["The Godfather"]);
        assert_eq!(labels(" the "), vec!["The Godfather", "The Dark Knight"]);
    }

    #[test]
    fn test_no_match_is_empty() {
        assert!(labels("zzz").is_empty());
    }

    #[test]
    fn test_blank_query_is_empty() {
        assert!(labels("").is_empty());
        assert!(labels("  \t").is_empty());
    }

    #[test]
    fn test_label_equals_search_query() {
        for s in fallback_suggestions("a") {
            assert_eq!(s.label, s.search_query);
            assert_eq!(s.kind, ResultKind::Movie);
        }
    }
}
