//! Weighted relevance scoring for search candidates.
//!
//! Every candidate gets four sub-scores in [0, 1], blended with fixed weights:
//!
//! 1. title: edit-distance similarity to the primary or original title,
//!    plus a flat bonus when the query is a literal substring of the title
//! 2. synopsis: share of query tokens found in the synopsis
//! 3. popularity: min-max normalized within the current batch
//! 4. year: proximity to a year typed in the query, else a recency prior
//!
//! Weights sum to 1.0 so the blended score stays in [0, 1].

use crate::candidate::Candidate;
use crate::interface::QueryInfo;
use crate::query::match_text;

pub const TITLE_WEIGHT: f64 = 0.6;
pub const SYNOPSIS_WEIGHT: f64 = 0.15;
pub const POPULARITY_WEIGHT: f64 = 0.15;
pub const YEAR_WEIGHT: f64 = 0.1;

/// Added to the title score when the query is a substring of the title; capped at 1.0.
const TITLE_SUBSTRING_BONUS: f64 = 0.1;

/// Year gap at which the proximity score reaches zero.
const YEAR_PROXIMITY_SPAN: f64 = 10.0;

/// Age in years at which the recency prior reaches zero.
const RECENCY_SPAN_YEARS: f64 = 50.0;

/// Popularity score when every candidate in the batch has the same value.
const NEUTRAL_POPULARITY: f64 = 0.5;

/// Batch-relative popularity range. Values are only comparable within one batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopularityStats {
    pub min: f64,
    pub max: f64,
}

impl PopularityStats {
    /// Min and max over the batch. An empty batch yields `{ 0, 0 }`.
    pub fn from_candidates(candidates: &[Candidate]) -> Self {
        let mut iter = candidates.iter().map(Candidate::popularity);
        let Some(first) = iter.next() else {
            return Self { min: 0.0, max: 0.0 };
        };
        iter.fold(Self { min: first, max: first }, |acc, p| Self {
            min: acc.min.min(p),
            max: acc.max.max(p),
        })
    }

    /// Min-max scale `value` into [0, 1]; a flat range scores neutral.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if !span.is_finite() || span <= f64::EPSILON {
            return NEUTRAL_POPULARITY;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }
}

/// The four sub-scores and their weighted total, for one candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub title: f64,
    pub synopsis: f64,
    pub popularity: f64,
    pub year: f64,
    pub total: f64,
}

/// Relevance of `candidate` for `query`, in [0, 1].
pub fn score_candidate(
    candidate: &Candidate,
    query: &QueryInfo,
    stats: &PopularityStats,
    current_year: i32,
) -> f64 {
    score_breakdown(candidate, query, stats, current_year).total
}

pub fn score_breakdown(
    candidate: &Candidate,
    query: &QueryInfo,
    stats: &PopularityStats,
    current_year: i32,
) -> ScoreBreakdown {
    let query_text = match_text(query);

    let title = title_score(candidate, &query_text);
    let synopsis = synopsis_score(candidate, &query.tokens);
    let popularity = stats.normalize(candidate.popularity());
    let year = year_score(candidate.release_year(), query.year, current_year);

    let total = (title * TITLE_WEIGHT
        + synopsis * SYNOPSIS_WEIGHT
        + popularity * POPULARITY_WEIGHT
        + year * YEAR_WEIGHT)
        .clamp(0.0, 1.0);

    ScoreBreakdown {
        title,
        synopsis,
        popularity,
        year,
        total,
    }
}

/// Best similarity against primary/original title, plus the substring bonus.
/// `query_text` must already be trimmed and lower-cased.
fn title_score(candidate: &Candidate, query_text: &str) -> f64 {
    if query_text.is_empty() {
        return 0.0;
    }
    let title_lower = candidate.title_lower();
    let best = similarity(query_text, title_lower)
        .max(similarity(query_text, candidate.original_title_lower()));

    if title_lower.contains(query_text) {
        (best + TITLE_SUBSTRING_BONUS).min(1.0)
    } else {
        best
    }
}

/// Fraction of query tokens found (as substrings) in the synopsis.
fn synopsis_score(candidate: &Candidate, tokens: &[String]) -> f64 {
    if tokens.is_empty() {
        return 0.0;
    }
    let Some(synopsis) = candidate.synopsis_lower() else {
        return 0.0;
    };
    let hits = tokens
        .iter()
        .filter(|token| synopsis.contains(token.as_str()))
        .count();
    hits as f64 / tokens.len() as f64
}

/// Year proximity when the query names a year, recency prior otherwise.
/// A candidate without a release year scores 0 either way.
pub(crate) fn year_score(candidate_year: Option<i32>, query_year: Option<i32>, current_year: i32) -> f64 {
    let Some(candidate_year) = candidate_year else {
        return 0.0;
    };
    match query_year {
        Some(query_year) => {
            let gap = candidate_year.abs_diff(query_year) as f64;
            (1.0 - gap / YEAR_PROXIMITY_SPAN).max(0.0)
        }
        None => {
            let age = (i64::from(current_year) - i64::from(candidate_year)) as f64;
            (1.0 - age / RECENCY_SPAN_YEARS).clamp(0.0, 1.0)
        }
    }
}

/// Normalized edit similarity between two strings, in [0, 1].
///
/// Both inputs are trimmed and lower-cased first. An empty side scores 0,
/// identical strings score 1.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }
    let longest = a.chars().count().max(b.chars().count());
    let distance = edit_distance(&a, &b);
    (1.0 - distance as f64 / longest as f64).clamp(0.0, 1.0)
}

/// Levenshtein distance (unit-cost insert, delete, substitute) over chars.
///
/// Two rolling rows sized by the shorter string: O(len(a)·len(b)) time,
/// O(min(len(a), len(b))) working space.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let (long, short) = if a.chars().count() >= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    let short_chars: Vec<char> = short.chars().collect();
    let n = short_chars.len();

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0usize; n + 1];

    for (i, lc) in long.chars().enumerate() {
        curr[0] = i + 1;
        for j in 1..=n {
            let cost = if lc == short_chars[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1)
                .min(curr[j - 1] + 1)
                .min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}
