//! Marquee FFI Interface Definition
//!
//! This file defines the public interface exposed to the host extension via UniFFI.
//! It acts as the source of truth for shared types: the suggestion records the
//! host renders, the callback traits the host implements, and the error type.

use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// ENUMS
// ═══════════════════════════════════════════════════════════════════════════════

/// What a suggestion points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, uniffi::Enum)]
pub enum ResultKind {
    Movie,
    Person,
    Unknown,
}

impl ResultKind {
    /// Parse the discriminator used by the remote sources ("movie", "person", ...)
    pub fn from_discriminator(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("movie") => ResultKind::Movie,
            Some("person") => ResultKind::Person,
            _ => ResultKind::Unknown,
        }
    }
}

/// How a settled lookup decides whether it is still the one the user is waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, uniffi::Enum, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StalenessCheck {
    /// Compare the lookup's query against the host's live input text only.
    QueryText,
    /// Require the lookup to belong to the latest scheduled generation
    /// and its query to still match the live input text.
    #[default]
    Generation,
}

/// Observable lifecycle of one pipeline session
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum PipelineState {
    /// Nothing scheduled; the last emission was an empty list.
    Idle,
    /// A debounce timer or a remote lookup is outstanding.
    Pending,
    /// The latest lookup settled and its ranked list was emitted.
    Resolved,
    /// The latest settled lookup was discarded because the input moved on.
    RejectedStale,
    /// The latest lookup failed and the fallback list was emitted.
    Failed,
    /// `dispose()` was called; all further input is ignored.
    Disposed,
}

// ═══════════════════════════════════════════════════════════════════════════════
// RECORDS (Structs)
// ═══════════════════════════════════════════════════════════════════════════════

/// Normalized shape of one raw query
///
/// `tokens` only holds lower-cased fragments of at least two characters, in the
/// order they were typed. A year, when found, is cut out of `clean_text`.
#[derive(Debug, Clone, PartialEq, Eq, Default, uniffi::Record)]
pub struct QueryInfo {
    pub raw: String,
    pub clean_text: String,
    pub year: Option<i32>,
    pub tokens: Vec<String>,
}

/// One row of the suggestion list handed to the host
///
/// `label` is display text; `search_query` is what the host navigates with
/// when the row is picked.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct Suggestion {
    pub kind: ResultKind,
    pub label: String,
    pub search_query: String,
}

/// Error type for Marquee operations
///
/// Lookup errors are recovered inside the pipeline (fallback list); they only
/// surface to callers of the lower-level source API and of constructors.
#[derive(Debug, Error, uniffi::Error)]
pub enum MarqueeError {
    #[error("Remote unavailable: {0}")]
    RemoteUnavailable(String),
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

pub type MarqueeResult<T> = Result<T, MarqueeError>;

// ═══════════════════════════════════════════════════════════════════════════════
// HOST CALLBACKS
// ═══════════════════════════════════════════════════════════════════════════════

/// Rendering side of the host. Fire-and-forget: nothing returned is consumed.
#[uniffi::export(with_foreign)]
pub trait SuggestionSink: Send + Sync {
    /// A lookup for `query` has been scheduled; show a non-interactive placeholder.
    fn show_loading(&self, query: String);

    /// Replace whatever is shown with `suggestions` (never empty).
    fn show_suggestions(&self, suggestions: Vec<Suggestion>);

    /// Nothing to show; hide the list.
    fn show_empty(&self);
}

/// Input side of the host. Read on demand when a lookup settles.
#[uniffi::export(with_foreign)]
pub trait QuerySource: Send + Sync {
    /// The text currently in the search field.
    fn current_query(&self) -> String;
}

impl From<reqwest::Error> for MarqueeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() || e.is_body() {
            MarqueeError::MalformedResponse(e.to_string())
        } else {
            MarqueeError::RemoteUnavailable(e.to_string())
        }
    }
}

impl From<serde_json::Error> for MarqueeError {
    fn from(e: serde_json::Error) -> Self {
        MarqueeError::MalformedResponse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_kind_from_discriminator() {
        assert_eq!(ResultKind::from_discriminator(Some("movie")), ResultKind::Movie);
        assert_eq!(ResultKind::from_discriminator(Some(" Person ")), ResultKind::Person);
        assert_eq!(ResultKind::from_discriminator(Some("tv")), ResultKind::Unknown);
        assert_eq!(ResultKind::from_discriminator(None), ResultKind::Unknown);
    }

    #[test]
    fn test_staleness_check_default_is_generation() {
        assert_eq!(StalenessCheck::default(), StalenessCheck::Generation);
    }

    #[test]
    fn test_json_error_maps_to_malformed() {
        let err = serde_json::from_str::<Vec<u32>>("{").unwrap_err();
        assert!(matches!(MarqueeError::from(err), MarqueeError::MalformedResponse(_)));
    }
}
