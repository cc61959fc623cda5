//! Wire models for remote candidate rows
//!
//! Both remote sources return loosely-shaped JSON rows. They are decoded into
//! one permissive [`RawCandidate`] and then mapped into the tagged
//! [`Candidate`] the scorer works on.

use crate::candidate::{Candidate, CandidateRecord, MovieRecord, OtherRecord, PersonRecord};
use crate::interface::ResultKind;
use serde::Deserialize;

// ─────────────────────────────────────────────────────────────────────────────
// RAW ROW (decoded from either source)
// ─────────────────────────────────────────────────────────────────────────────

/// A year may arrive as an integer, a float, or a numeric string.
/// Anything else decodes to `Other` and is treated as no year.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum YearField {
    Number(i64),
    Float(f64),
    Text(String),
    Other(serde_json::Value),
}

impl YearField {
    fn to_year(&self) -> Option<i32> {
        match self {
            YearField::Number(n) => i32::try_from(*n).ok(),
            YearField::Float(f) => whole_year(*f),
            YearField::Text(s) => {
                let s = s.trim();
                s.parse().ok().or_else(|| s.parse::<f64>().ok().and_then(whole_year))
            }
            YearField::Other(_) => None,
        }
    }
}

fn whole_year(value: f64) -> Option<i32> {
    let in_range = value.is_finite() && value >= i32::MIN as f64 && value <= i32::MAX as f64;
    (in_range && value.fract() == 0.0).then_some(value as i32)
}

/// One candidate row as a remote source returns it.
///
/// Every field is optional; missing and `null` both decode to `None`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawCandidate {
    /// `result_type` on the relational backend, `media_type` on the metadata API.
    #[serde(alias = "media_type")]
    pub result_type: Option<String>,
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub name: Option<String>,
    pub original_name: Option<String>,
    pub release_year: Option<YearField>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub popularity: Option<f64>,
    pub overview: Option<String>,
}

impl RawCandidate {
    pub fn kind(&self) -> ResultKind {
        ResultKind::from_discriminator(self.result_type.as_deref())
    }

    /// Explicit year first, then the leading `YYYY` of a date.
    pub fn year(&self) -> Option<i32> {
        self.release_year
            .as_ref()
            .and_then(YearField::to_year)
            .or_else(|| self.release_date.as_deref().and_then(year_from_date))
            .or_else(|| self.first_air_date.as_deref().and_then(year_from_date))
    }

    pub fn into_candidate(self) -> Candidate {
        let kind = self.kind();
        let year = self.year();
        let title = non_blank(self.title);
        let name = non_blank(self.name);
        let original_title = non_blank(self.original_title);
        let original_name = non_blank(self.original_name);
        let overview = non_blank(self.overview);

        let record = match kind {
            ResultKind::Movie => CandidateRecord::Movie(MovieRecord {
                title: title.or(name).unwrap_or_default(),
                original_title: original_title.or(original_name),
                release_year: year,
                popularity: self.popularity,
                overview,
            }),
            ResultKind::Person => CandidateRecord::Person(PersonRecord {
                name: name.or(title).unwrap_or_default(),
                original_name: original_name.or(original_title),
                popularity: self.popularity,
            }),
            ResultKind::Unknown => CandidateRecord::Unknown(OtherRecord {
                name: title.or(name),
                original_name: original_title.or(original_name),
                release_year: year,
                popularity: self.popularity,
                overview,
            }),
        };
        Candidate::new(record)
    }
}

fn year_from_date(date: &str) -> Option<i32> {
    let head = date.trim().get(..4)?;
    if head.bytes().all(|b| b.is_ascii_digit()) {
        head.parse().ok()
    } else {
        None
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
