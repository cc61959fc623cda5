//! Remote candidate sources
//!
//! Two HTTP collaborators can answer a lookup: a relational backend exposing a
//! `search_all` stored procedure, and a public movie-metadata search API.
//! Both share one `reqwest::Client` and decode into [`RawCandidate`] rows.

use crate::candidate::Candidate;
use crate::config::{MarqueeConfig, RemoteConfig, RemoteKind};
use crate::interface::{MarqueeError, MarqueeResult};
use crate::models::RawCandidate;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const USER_AGENT: &str = concat!("marquee/", env!("CARGO_PKG_VERSION"));
const RPC_SEARCH_PATH: &str = "/rest/v1/rpc/search_all";
const METADATA_SEARCH_PATH: &str = "/search/multi";
/// Error bodies are only kept for diagnostics.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Anything that can turn a query into raw candidates.
///
/// Implementations must not rank or filter beyond `limit`: ordering is the
/// Ranker's job.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> MarqueeResult<Vec<Candidate>>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Shared HTTP client for the remote sources.
pub fn build_client(timeout: Option<Duration>) -> MarqueeResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| MarqueeError::InvalidConfig(format!("http client: {e}")))
}

/// Build the source selected by `config.remote.source`.
pub fn build_source(config: &MarqueeConfig) -> MarqueeResult<Arc<dyn CandidateSource>> {
    let client = build_client(config.lookup_timeout())?;
    Ok(source_for(&config.remote, client))
}

fn source_for(remote: &RemoteConfig, client: reqwest::Client) -> Arc<dyn CandidateSource> {
    match remote.source {
        RemoteKind::Rpc => Arc::new(RpcSearchSource::new(
            client,
            remote.rpc_url.clone(),
            remote.rpc_key.clone(),
        )),
        RemoteKind::Metadata => Arc::new(MetadataSearchSource::new(
            client,
            remote.metadata_base_url.clone(),
            remote.metadata_api_key.clone(),
        )),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RELATIONAL BACKEND (stored procedure over REST)
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
struct RpcSearchBody<'a> {
    q: &'a str,
    limit_count: usize,
}

pub struct RpcSearchSource {
    client: reqwest::Client,
    base_url: Option<String>,
    api_key: Option<String>,
}

impl RpcSearchSource {
    pub fn new(client: reqwest::Client, base_url: Option<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }

    fn endpoint(&self) -> MarqueeResult<(String, &str)> {
        match (self.base_url.as_deref(), self.api_key.as_deref()) {
            (Some(url), Some(key)) => Ok((
                format!("{}{}", url.trim_end_matches('/'), RPC_SEARCH_PATH),
                key,
            )),
            _ => Err(MarqueeError::RemoteUnavailable(
                "relational source is not configured".into(),
            )),
        }
    }
}

#[async_trait]
impl CandidateSource for RpcSearchSource {
    async fn search(&self, query: &str, limit: usize) -> MarqueeResult<Vec<Candidate>> {
        let (url, key) = self.endpoint()?;

        let response = self
            .client
            .post(&url)
            .header("apikey", key)
            .bearer_auth(key)
            .json(&RpcSearchBody {
                q: query,
                limit_count: limit,
            })
            .send()
            .await?;

        let body = read_success_body(response).await?;
        decode_rpc_rows(&body)
    }

    fn name(&self) -> &'static str {
        "rpc"
    }
}

/// The stored procedure returns a bare JSON array of rows.
pub fn decode_rpc_rows(body: &str) -> MarqueeResult<Vec<Candidate>> {
    let rows: Vec<RawCandidate> = serde_json::from_str(body)?;
    Ok(rows.into_iter().map(RawCandidate::into_candidate).collect())
}

// ═══════════════════════════════════════════════════════════════════════════════
// METADATA SEARCH API
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
struct MetadataPage {
    #[serde(default)]
    results: Vec<RawCandidate>,
}

pub struct MetadataSearchSource {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl MetadataSearchSource {
    pub fn new(client: reqwest::Client, base_url: String, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl CandidateSource for MetadataSearchSource {
    async fn search(&self, query: &str, limit: usize) -> MarqueeResult<Vec<Candidate>> {
        let key = self.api_key.as_deref().ok_or_else(|| {
            MarqueeError::RemoteUnavailable("metadata source is not configured".into())
        })?;
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), METADATA_SEARCH_PATH);

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", key), ("query", query)])
            .send()
            .await?;

        let body = read_success_body(response).await?;
        decode_metadata_page(&body, limit)
    }

    fn name(&self) -> &'static str {
        "metadata"
    }
}

/// The search API returns a page object; only the first `limit` rows are kept.
pub fn decode_metadata_page(body: &str, limit: usize) -> MarqueeResult<Vec<Candidate>> {
    let page: MetadataPage = serde_json::from_str(body)?;
    Ok(page
        .results
        .into_iter()
        .take(limit)
        .map(RawCandidate::into_candidate)
        .collect())
}

// ═══════════════════════════════════════════════════════════════════════════════
// SHARED
// ═══════════════════════════════════════════════════════════════════════════════

async fn read_success_body(response: reqwest::Response) -> MarqueeResult<String> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        let snippet: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        return Err(MarqueeError::RemoteUnavailable(format!("HTTP {status}: {snippet}")));
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::ResultKind;

    #[test]
    fn test_decode_rpc_rows() {
        let body = r#"[
            {"result_type": "movie", "title": "Heat", "release_year": 1995, "popularity": 40.0},
            {"result_type": "person", "name": "Michael Mann", "popularity": 9.5},
            {"result_type": "list", "title": "Crime classics"}
        ]"#;
        let candidates = decode_rpc_rows(body).unwrap();
        let kinds: Vec<_> = candidates.iter().map(Candidate::kind).collect();
        assert_eq!(kinds, vec![ResultKind::Movie, ResultKind::Person, ResultKind::Unknown]);
        assert_eq!(candidates[2].title(), "Crime classics");
    }

    #[test]
    fn test_decode_metadata_page_truncates() {
        let body = r#"{"page": 1, "results": [
            {"media_type": "movie", "title": "Alien", "release_date": "1979-05-25"},
            {"media_type": "movie", "title": "Aliens", "release_date": "1986-07-18"},
            {"media_type": "movie", "title": "Alien 3", "release_date": "1992-05-22"}
        ]}"#;
        let candidates = decode_metadata_page(body, 2).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[1].release_year(), Some(1986));
    }

    #[test]
    fn test_malformed_bodies() {
        assert!(matches!(
            decode_rpc_rows(r#"{"error": "nope"}"#),
            Err(MarqueeError::MalformedResponse(_))
        ));
        assert!(matches!(
            decode_metadata_page("<html>", 5),
            Err(MarqueeError::MalformedResponse(_))
        ));
        assert!(decode_metadata_page("{}", 5).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unconfigured_sources_fail_fast() {
        let client = build_client(None).unwrap();

        let rpc = RpcSearchSource::new(client.clone(), Some("https://db.example.test".into()), None);
        let err = rpc.search("heat", 10).await.unwrap_err();
        assert!(matches!(err, MarqueeError::RemoteUnavailable(_)));

        let metadata = MetadataSearchSource::new(client, "https://api.example.test".into(), None);
        let err = metadata.search("heat", 10).await.unwrap_err();
        assert!(matches!(err, MarqueeError::RemoteUnavailable(_)));
    }

    #[test]
    fn test_build_source_follows_selector() {
        let mut config = MarqueeConfig::default();
        assert_eq!(build_source(&config).unwrap().name(), "rpc");
        config.remote.source = RemoteKind::Metadata;
        assert_eq!(build_source(&config).unwrap().name(), "metadata");
    }
}
