//! Runtime configuration for a suggestion pipeline.
//!
//! Everything has a usable default. Missing credentials are not rejected
//! here: the source reports `RemoteUnavailable` at lookup time and the
//! pipeline falls back to the built-in list.

use crate::interface::{MarqueeError, MarqueeResult, StalenessCheck};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_DEBOUNCE_MS: u64 = 100;
pub const DEFAULT_REMOTE_LIMIT: u32 = 10;
pub const DEFAULT_SUGGESTION_LIMIT: u32 = 5;
pub const DEFAULT_LOOKUP_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_METADATA_BASE_URL: &str = "https://api.themoviedb.org/3";

const ENV_RPC_URL: &str = "MARQUEE_RPC_URL";
const ENV_RPC_KEY: &str = "MARQUEE_RPC_KEY";
const ENV_TMDB_API_KEY: &str = "MARQUEE_TMDB_API_KEY";
const ENV_TMDB_BASE_URL: &str = "MARQUEE_TMDB_BASE_URL";
const ENV_SOURCE: &str = "MARQUEE_SOURCE";
const ENV_DEBOUNCE_MS: &str = "MARQUEE_DEBOUNCE_MS";
const ENV_LOOKUP_TIMEOUT_MS: &str = "MARQUEE_LOOKUP_TIMEOUT_MS";

/// Which remote collaborator answers lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, uniffi::Enum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteKind {
    /// Relational backend exposing a `search_all` stored procedure.
    #[default]
    Rpc,
    /// Public movie-metadata search API.
    Metadata,
}

impl std::str::FromStr for RemoteKind {
    type Err = MarqueeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rpc" => Ok(RemoteKind::Rpc),
            "metadata" | "tmdb" => Ok(RemoteKind::Metadata),
            other => Err(MarqueeError::InvalidConfig(format!(
                "unknown remote source '{other}' (expected rpc or metadata)"
            ))),
        }
    }
}

/// Endpoint and credentials for the remote sources
#[derive(Debug, Clone, PartialEq, uniffi::Record, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub source: RemoteKind,
    pub rpc_url: Option<String>,
    pub rpc_key: Option<String>,
    pub metadata_api_key: Option<String>,
    pub metadata_base_url: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            source: RemoteKind::default(),
            rpc_url: None,
            rpc_key: None,
            metadata_api_key: None,
            metadata_base_url: DEFAULT_METADATA_BASE_URL.to_string(),
        }
    }
}

/// Pipeline tuning
#[derive(Debug, Clone, PartialEq, uniffi::Record, Serialize, Deserialize)]
#[serde(default)]
pub struct MarqueeConfig {
    /// Idle time after the last keystroke before a lookup is dispatched.
    pub debounce_ms: u64,
    /// How many raw candidates to ask the remote source for.
    pub remote_limit: u32,
    /// How many ranked suggestions to show.
    pub suggestion_limit: u32,
    /// Upper bound on one lookup. 0 waits forever.
    pub lookup_timeout_ms: u64,
    pub staleness: StalenessCheck,
    pub remote: RemoteConfig,
}

impl Default for MarqueeConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            remote_limit: DEFAULT_REMOTE_LIMIT,
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
            lookup_timeout_ms: DEFAULT_LOOKUP_TIMEOUT_MS,
            staleness: StalenessCheck::default(),
            remote: RemoteConfig::default(),
        }
    }
}

impl MarqueeConfig {
    /// Defaults overlaid with `MARQUEE_*` environment variables.
    pub fn from_env() -> MarqueeResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable lookup.
    pub fn from_lookup<F>(lookup: F) -> MarqueeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut config = Self::default();

        if let Some(url) = var(ENV_RPC_URL) {
            config.remote.rpc_url = Some(url);
        }
        if let Some(key) = var(ENV_RPC_KEY) {
            config.remote.rpc_key = Some(key);
        }
        if let Some(key) = var(ENV_TMDB_API_KEY) {
            config.remote.metadata_api_key = Some(key);
        }
        if let Some(base) = var(ENV_TMDB_BASE_URL) {
            config.remote.metadata_base_url = base;
        }
        if let Some(source) = var(ENV_SOURCE) {
            config.remote.source = source.parse()?;
        }
        if let Some(ms) = var(ENV_DEBOUNCE_MS) {
            config.debounce_ms = parse_millis(ENV_DEBOUNCE_MS, &ms)?;
        }
        if let Some(ms) = var(ENV_LOOKUP_TIMEOUT_MS) {
            config.lookup_timeout_ms = parse_millis(ENV_LOOKUP_TIMEOUT_MS, &ms)?;
        }

        Ok(config)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// `None` when lookups may run without a deadline.
    pub fn lookup_timeout(&self) -> Option<Duration> {
        (self.lookup_timeout_ms > 0).then(|| Duration::from_millis(self.lookup_timeout_ms))
    }
}

fn parse_millis(key: &str, value: &str) -> MarqueeResult<u64> {
    value
        .parse::<u64>()
        .map_err(|e| MarqueeError::InvalidConfig(format!("{key}={value}: {e}")))
}
