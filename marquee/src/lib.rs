//! Marquee Core - search-as-you-type film suggestions
//!
//! This library implements the suggestion engine behind a search box: query
//! analysis, fuzzy ranking of remote candidates, and a debounced pipeline that
//! only ever renders results for what the user is currently typing.
//!
//! Types are exported via UniFFI proc-macros (#[derive(uniffi::Record/Enum/Object)]).

pub mod candidate;
pub mod config;
pub mod fallback;
pub mod interface;
pub mod links;
pub mod models;
mod pipeline;
pub mod query;
pub mod ranking;
pub mod remote;
pub mod search;

pub use config::{MarqueeConfig, RemoteConfig, RemoteKind};
pub use interface::*;
pub use pipeline::{fetch_candidates, fetch_ranked, SuggestionPipeline};
pub use remote::CandidateSource;

uniffi::setup_scaffolding!("marquee");
