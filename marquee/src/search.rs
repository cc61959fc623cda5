//! Ranker: scores a raw candidate batch, orders it and maps it to suggestions.
//!
//! Popularity is normalized against the batch being ranked, so the same batch
//! always ranks the same way regardless of what came before it.

use crate::candidate::{Candidate, CandidateRecord};
use crate::interface::{QueryInfo, ResultKind, Suggestion};
use crate::ranking::score_candidate;
use chrono::{Datelike, Utc};

pub use crate::ranking::PopularityStats;

/// Number of suggestions shown when the caller doesn't say otherwise.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

const UNTITLED_LABEL: &str = "Untitled";
const UNKNOWN_PERSON_LABEL: &str = "Unknown person";
const UNKNOWN_LABEL: &str = "Unknown";

/// A candidate paired with its relevance. Only used as an ordering key.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub score: f64,
}

/// Rank against the current calendar year.
pub fn rank(candidates: Vec<Candidate>, query: &QueryInfo, limit: usize) -> Vec<Suggestion> {
    rank_at(candidates, query, limit, current_year())
}

/// Rank with an explicit "current year" for the recency prior.
pub fn rank_at(
    candidates: Vec<Candidate>,
    query: &QueryInfo,
    limit: usize,
    current_year: i32,
) -> Vec<Suggestion> {
    let mut scored = score_batch(candidates, query, current_year);
    scored.truncate(limit);
    scored.iter().map(|s| to_suggestion(&s.candidate)).collect()
}

/// Score every candidate and sort by descending score.
/// The sort is stable: equal scores keep their input order.
pub fn score_batch(
    candidates: Vec<Candidate>,
    query: &QueryInfo,
    current_year: i32,
) -> Vec<ScoredCandidate> {
    if candidates.is_empty() {
        return Vec::new();
    }

    #[cfg(feature = "perf-log")]
    let t0 = std::time::Instant::now();

    let stats = PopularityStats::from_candidates(&candidates);
    let mut scored: Vec<ScoredCandidate> = candidates
        .into_iter()
        .map(|candidate| {
            let score = score_candidate(&candidate, query, &stats, current_year);
            ScoredCandidate { candidate, score }
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));

    #[cfg(feature = "perf-log")]
    tracing::debug!(
        elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0,
        candidates = scored.len(),
        "[perf] score_batch"
    );

    scored
}

/// Display label and navigation query for one candidate.
pub fn to_suggestion(candidate: &Candidate) -> Suggestion {
    match candidate.record() {
        CandidateRecord::Movie(movie) => {
            let title = non_empty(&movie.title).unwrap_or(UNTITLED_LABEL);
            let label = match movie.release_year {
                Some(year) => format!("{title} ({year})"),
                None => title.to_string(),
            };
            Suggestion {
                kind: ResultKind::Movie,
                label,
                search_query: title.to_string(),
            }
        }
        CandidateRecord::Person(person) => {
            let name = non_empty(&person.name).unwrap_or(UNKNOWN_PERSON_LABEL);
            Suggestion {
                kind: ResultKind::Person,
                label: name.to_string(),
                search_query: name.to_string(),
            }
        }
        CandidateRecord::Unknown(other) => {
            let name = other.name.as_deref().and_then(non_empty);
            Suggestion {
                kind: ResultKind::Unknown,
                label: name.unwrap_or(UNKNOWN_LABEL).to_string(),
                search_query: name.unwrap_or_default().to_string(),
            }
        }
    }
}

pub(crate) fn current_year() -> i32 {
    Utc::now().year()
}

fn non_empty(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::{MovieRecord, OtherRecord, PersonRecord};
    use crate::query::analyze;

    const NOW: i32 = 2025;

    fn movie(title: &str, year: Option<i32>, popularity: f64) -> Candidate {
        MovieRecord {
            title: title.to_string(),
            release_year: year,
            popularity: Some(popularity),
            ..Default::default()
        }
        .into()
    }

    #[test]
    fn test_empty_batch() {
        assert!(rank_at(Vec::new(), &analyze("anything"), 5, NOW).is_empty());
    }

    #[test]
    fn test_best_match_first() {
        let batch = vec![
            movie("Batman Begins", Some(2005), 40.0),
            movie("The Batman", Some(2022), 60.0),
            movie("Batman", Some(1989), 20.0),
        ];
        let out = rank_at(batch, &analyze("batman 1989"), 5, NOW);
        assert_eq!(out[0].label, "Batman (1989)");
        assert_eq!(out[0].search_query, "Batman");
    }

    #[test]
    fn test_truncates_to_limit() {
        let batch: Vec<Candidate> = (0..12)
            .map(|i| movie(&format!("Movie {i}"), Some(2000 + i), i as f64))
            .collect();
        let query = analyze("movie");
        assert_eq!(rank_at(batch.clone(), &query, DEFAULT_SUGGESTION_LIMIT, NOW).len(), 5);
        assert_eq!(rank_at(batch, &query, 0, NOW).len(), 0);
    }

    #[test]
    fn test_sorted_descending_and_stable_on_ties() {
        // Identical records score identically; input order must survive
        let batch = vec![
            movie("Alien", None, 1.0),
            movie("Avatar", None, 1.0),
            movie("Alien", None, 1.0),
            movie("Heat", None, 1.0),
        ];
        let query = analyze("alien");
        let scored = score_batch(batch, &query, NOW);

        for pair in scored.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        let titles: Vec<&str> = scored.iter().map(|s| s.candidate.title()).collect();
        assert_eq!(titles[0], "Alien");
        assert_eq!(titles[1], "Alien");
    }

    #[test]
    fn test_ties_keep_input_order() {
        // Overview text doesn't matter for a query with no synopsis hits
        let tagged = |tag: &str| -> Candidate {
            MovieRecord {
                title: "Zulu".into(),
                overview: Some(tag.into()),
                popularity: Some(1.0),
                ..Default::default()
            }
            .into()
        };
        let batch = vec![tagged("first"), tagged("second"), tagged("third")];
        let scored = score_batch(batch, &analyze("zulu"), NOW);
        let order: Vec<_> = scored.iter().filter_map(|s| s.candidate.synopsis()).collect();
        assert_eq!(order, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_person_and_unknown_labels() {
        let person: Candidate = PersonRecord {
            name: "Agnès Varda".into(),
            ..Default::default()
        }
        .into();
        let s = to_suggestion(&person);
        assert_eq!(s.kind, ResultKind::Person);
        assert_eq!(s.label, "Agnès Varda");
        assert_eq!(s.search_query, "Agnès Varda");

        let unknown: Candidate = OtherRecord {
            name: Some("Twin Peaks".into()),
            release_year: Some(1990),
            ..Default::default()
        }
        .into();
        let s = to_suggestion(&unknown);
        assert_eq!(s.kind, ResultKind::Unknown);
        assert_eq!(s.label, "Twin Peaks");

        let nameless: Candidate = OtherRecord::default().into();
        let s = to_suggestion(&nameless);
        assert_eq!(s.label, "Unknown");
        assert_eq!(s.search_query, "");
    }

    #[test]
    fn test_untitled_movie() {
        let s = to_suggestion(&movie("  ", Some(2001), 0.0));
        assert_eq!(s.label, "Untitled (2001)");
        assert_eq!(s.search_query, "Untitled");
    }
}
