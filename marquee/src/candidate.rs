//! Search candidate with memoized derived state.
//!
//! Module isolation ensures no code outside this module can mutate the record
//! after construction, so the `OnceLock` caches can never go stale.

use crate::interface::ResultKind;
use std::sync::OnceLock;

/// A film returned by a remote source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieRecord {
    pub title: String,
    pub original_title: Option<String>,
    pub release_year: Option<i32>,
    pub popularity: Option<f64>,
    pub overview: Option<String>,
}

/// A cast or crew member returned by a remote source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonRecord {
    pub name: String,
    pub original_name: Option<String>,
    pub popularity: Option<f64>,
}

/// Anything else a source hands back (TV shows, collections, unknown rows).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OtherRecord {
    /// Title or name, whichever the row carried.
    pub name: Option<String>,
    pub original_name: Option<String>,
    pub release_year: Option<i32>,
    pub popularity: Option<f64>,
    pub overview: Option<String>,
}

/// Kind-tagged raw record. Scoring and suggestion mapping match on this exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateRecord {
    Movie(MovieRecord),
    Person(PersonRecord),
    Unknown(OtherRecord),
}

/// A search candidate with memoized lower-cased text.
/// `title_lower()` and friends are computed on first access and cached,
/// since the scorer reads each of them more than once per pass.
#[derive(Debug, Clone)]
pub struct Candidate {
    record: CandidateRecord,
    title_lower: OnceLock<String>,
    original_title_lower: OnceLock<String>,
    synopsis_lower: OnceLock<Option<String>>,
}

impl Candidate {
    pub fn new(record: CandidateRecord) -> Self {
        Self {
            record,
            title_lower: OnceLock::new(),
            original_title_lower: OnceLock::new(),
            synopsis_lower: OnceLock::new(),
        }
    }

    pub fn record(&self) -> &CandidateRecord {
        &self.record
    }

    pub fn kind(&self) -> ResultKind {
        match &self.record {
            CandidateRecord::Movie(_) => ResultKind::Movie,
            CandidateRecord::Person(_) => ResultKind::Person,
            CandidateRecord::Unknown(_) => ResultKind::Unknown,
        }
    }

    /// Primary title (films) or name (people). Empty when the row had neither.
    pub fn title(&self) -> &str {
        match &self.record {
            CandidateRecord::Movie(m) => &m.title,
            CandidateRecord::Person(p) => &p.name,
            CandidateRecord::Unknown(o) => o.name.as_deref().unwrap_or(""),
        }
    }

    /// Original-language title, falling back to the primary title.
    pub fn original_title(&self) -> &str {
        let original = match &self.record {
            CandidateRecord::Movie(m) => m.original_title.as_deref(),
            CandidateRecord::Person(p) => p.original_name.as_deref(),
            CandidateRecord::Unknown(o) => o.original_name.as_deref(),
        };
        match original {
            Some(text) if !text.trim().is_empty() => text,
            _ => self.title(),
        }
    }

    pub fn release_year(&self) -> Option<i32> {
        match &self.record {
            CandidateRecord::Movie(m) => m.release_year,
            CandidateRecord::Person(_) => None,
            CandidateRecord::Unknown(o) => o.release_year,
        }
    }

    /// Raw popularity metric; missing or non-finite values read as 0.
    pub fn popularity(&self) -> f64 {
        let value = match &self.record {
            CandidateRecord::Movie(m) => m.popularity,
            CandidateRecord::Person(p) => p.popularity,
            CandidateRecord::Unknown(o) => o.popularity,
        };
        value.filter(|v| v.is_finite()).unwrap_or(0.0)
    }

    pub fn synopsis(&self) -> Option<&str> {
        match &self.record {
            CandidateRecord::Movie(m) => m.overview.as_deref(),
            CandidateRecord::Person(_) => None,
            CandidateRecord::Unknown(o) => o.overview.as_deref(),
        }
    }

    pub fn title_lower(&self) -> &str {
        self.title_lower
            .get_or_init(|| self.title().trim().to_lowercase())
    }

    pub fn original_title_lower(&self) -> &str {
        self.original_title_lower
            .get_or_init(|| self.original_title().trim().to_lowercase())
    }

    pub fn synopsis_lower(&self) -> Option<&str> {
        self.synopsis_lower
            .get_or_init(|| {
                self.synopsis()
                    .filter(|s| !s.trim().is_empty())
                    .map(str::to_lowercase)
            })
            .as_deref()
    }
}

impl From<CandidateRecord> for Candidate {
    fn from(record: CandidateRecord) -> Self {
        Candidate::new(record)
    }
}

impl From<MovieRecord> for Candidate {
    fn from(record: MovieRecord) -> Self {
        Candidate::new(CandidateRecord::Movie(record))
    }
}

impl From<PersonRecord> for Candidate {
    fn from(record: PersonRecord) -> Self {
        Candidate::new(CandidateRecord::Person(record))
    }
}

impl From<OtherRecord> for Candidate {
    fn from(record: OtherRecord) -> Self {
        Candidate::new(CandidateRecord::Unknown(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_original_title_falls_back_to_title() {
        let c: Candidate = MovieRecord {
            title: "Spirited Away".into(),
            original_title: Some("  ".into()),
            ..Default::default()
        }
        .into();
        assert_eq!(c.original_title(), "Spirited Away");

        let c: Candidate = MovieRecord {
            title: "Spirited Away".into(),
            original_title: Some("千と千尋の神隠し".into()),
            ..Default::default()
        }
        .into();
        assert_eq!(c.original_title(), "千と千尋の神隠し");
    }

    #[test]
    fn test_person_has_no_year_or_synopsis() {
        let c: Candidate = PersonRecord {
            name: "Greta Gerwig".into(),
            popularity: Some(12.5),
            ..Default::default()
        }
        .into();
        assert_eq!(c.kind(), ResultKind::Person);
        assert_eq!(c.release_year(), None);
        assert_eq!(c.synopsis_lower(), None);
        assert_eq!(c.title_lower(), "greta gerwig");
    }

    #[test]
    fn test_non_finite_popularity_reads_as_zero() {
        let c: Candidate = MovieRecord {
            title: "X".into(),
            popularity: Some(f64::NAN),
            ..Default::default()
        }
        .into();
        assert_eq!(c.popularity(), 0.0);
    }

    #[test]
    fn test_unknown_without_name() {
        let c: Candidate = OtherRecord::default().into();
        assert_eq!(c.kind(), ResultKind::Unknown);
        assert_eq!(c.title(), "");
        assert_eq!(c.original_title(), "");
    }
}
