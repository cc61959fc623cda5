//! SuggestionPipeline - one search-box session, exported to the host via UniFFI
//!
//! Every keystroke reschedules a debounce timer. When the timer fires, the
//! query captured at schedule time is sent to the remote source. Lookups are
//! never aborted once dispatched; when one settles it is checked against the
//! host's live text (and, by default, the latest scheduling generation) and
//! either rendered or dropped.
//!
//! Timer Cancellation Architecture:
//! Each schedule owns a CancellationToken. Rescheduling, clearing the input and
//! dispose() cancel the previous token, which wins the race against the
//! debounce sleep inside the spawned timer task. Once the sleep wins, the
//! lookup runs to completion.

use crate::candidate::Candidate;
use crate::config::MarqueeConfig;
use crate::fallback::fallback_suggestions;
use crate::interface::{
    MarqueeError, MarqueeResult, PipelineState, QuerySource, StalenessCheck, Suggestion,
    SuggestionSink,
};
use crate::query::analyze;
use crate::remote::{build_source, CandidateSource};
use crate::search::rank;
use once_cell::sync::Lazy;
use parking_lot::{Mutex, ReentrantMutex};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Global fallback Tokio runtime for when the pipeline is created outside any runtime context.
/// Shared across all pipelines and never dropped. UniFFI callers land here.
static FALLBACK_RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("marquee-pipeline")
        .enable_all()
        .build()
        .expect("Failed to create fallback tokio runtime")
});

/// Current runtime if available, otherwise the global fallback
fn runtime_handle() -> tokio::runtime::Handle {
    tokio::runtime::Handle::try_current().unwrap_or_else(|_| FALLBACK_RUNTIME.handle().clone())
}

/// Ask `source` for raw candidates, bounded by the configured lookup timeout.
pub async fn fetch_candidates(
    source: &dyn CandidateSource,
    query: &str,
    config: &MarqueeConfig,
) -> MarqueeResult<Vec<Candidate>> {
    let lookup = source.search(query, config.remote_limit as usize);
    match config.lookup_timeout() {
        Some(deadline) => tokio::time::timeout(deadline, lookup)
            .await
            .map_err(|_| MarqueeError::RemoteUnavailable("timed out".into()))?,
        None => lookup.await,
    }
}

/// One lookup followed by ranking, with no staleness tracking.
pub async fn fetch_ranked(
    source: &dyn CandidateSource,
    query: &str,
    config: &MarqueeConfig,
) -> MarqueeResult<Vec<Suggestion>> {
    let candidates = fetch_candidates(source, query, config).await?;
    Ok(rank(candidates, &analyze(query), config.suggestion_limit as usize))
}

/// Mutable per-session state. Only touched under `PipelineInner::session`.
struct Session {
    /// Token of the most recently scheduled debounce timer.
    timer: Option<CancellationToken>,
    /// Trimmed query of the most recent schedule; what the fallback list filters on.
    last_requested: Option<String>,
    state: PipelineState,
}

struct PipelineInner {
    config: MarqueeConfig,
    source: Arc<dyn CandidateSource>,
    sink: Arc<dyn SuggestionSink>,
    input: Arc<dyn QuerySource>,
    runtime: tokio::runtime::Handle,
    /// Bumped on every schedule, every empty query and on dispose.
    generation: AtomicU64,
    session: Mutex<Session>,
    /// Held across every sink call together with the generation bump or
    /// staleness check that decided it. Reentrant so a sink callback may
    /// feed a keystroke straight back into the pipeline.
    output: ReentrantMutex<()>,
}

/// Debounced, staleness-checked suggestion session
///
/// Concurrency Model:
/// - At most one debounce timer is live; scheduling supersedes the previous one
/// - Several lookups may be in flight; they settle in completion order
/// - The staleness check is the only ordering guarantee
/// - Host callbacks are invoked with the session lock released, under the output lock
#[derive(uniffi::Object)]
pub struct SuggestionPipeline {
    inner: Arc<PipelineInner>,
}

// Internal implementation (not exported via FFI)
impl SuggestionPipeline {
    /// Build a pipeline over any candidate source.
    pub fn with_source(
        config: MarqueeConfig,
        source: Arc<dyn CandidateSource>,
        sink: Arc<dyn SuggestionSink>,
        input: Arc<dyn QuerySource>,
    ) -> Self {
        Self {
            inner: Arc::new(PipelineInner {
                config,
                source,
                sink,
                input,
                runtime: runtime_handle(),
                generation: AtomicU64::new(0),
                session: Mutex::new(Session {
                    timer: None,
                    last_requested: None,
                    state: PipelineState::Idle,
                }),
                output: ReentrantMutex::new(()),
            }),
        }
    }
}

#[uniffi::export]
impl SuggestionPipeline {
    /// Create a pipeline backed by the remote source selected in `config`.
    #[uniffi::constructor]
    pub fn new(
        config: MarqueeConfig,
        sink: Arc<dyn SuggestionSink>,
        input: Arc<dyn QuerySource>,
    ) -> Result<Self, MarqueeError> {
        let source = build_source(&config)?;
        Ok(Self::with_source(config, source, sink, input))
    }

    /// The host's search text changed.
    pub fn on_query_changed(&self, raw_query: String) {
        self.inner.on_query_changed(raw_query);
    }

    /// Re-read the host's current text and treat it as a change
    /// (input focus, or text already present when the pipeline attached).
    pub fn refresh(&self) {
        let current = self.inner.input.current_query();
        self.inner.on_query_changed(current);
    }

    /// Stop the session. Pending timers are cancelled and in-flight lookups
    /// are ignored when they settle. Idempotent.
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    pub fn state(&self) -> PipelineState {
        self.inner.session.lock().state
    }
}

impl Drop for SuggestionPipeline {
    fn drop(&mut self) {
        self.inner.dispose();
    }
}

impl PipelineInner {
    fn on_query_changed(self: &Arc<Self>, raw_query: String) {
        let query = raw_query.trim().to_string();

        let _output = self.output.lock();
        let mut session = self.session.lock();
        if session.state == PipelineState::Disposed {
            return;
        }
        if let Some(previous) = session.timer.take() {
            previous.cancel();
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if query.is_empty() {
            session.state = PipelineState::Idle;
            drop(session);
            debug!(generation, "empty query, hiding suggestions");
            self.sink.show_empty();
            return;
        }

        let token = CancellationToken::new();
        session.timer = Some(token.clone());
        session.last_requested = Some(query.clone());
        session.state = PipelineState::Pending;
        drop(session);

        debug!(query = %query, generation, "scheduling lookup");
        self.sink.show_loading(raw_query);
        self.spawn_timer(query, generation, token);
    }

    fn spawn_timer(self: &Arc<Self>, query: String, generation: u64, token: CancellationToken) {
        let inner = Arc::clone(self);
        let debounce = self.config.debounce();

        self.runtime.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!(generation, "debounce timer superseded");
                    return;
                }
                _ = tokio::time::sleep(debounce) => {}
            }
            inner.run_lookup(query, generation).await;
        });
    }

    async fn run_lookup(&self, query: String, generation: u64) {
        debug!(query = %query, generation, source = self.source.name(), "dispatching lookup");

        match fetch_candidates(self.source.as_ref(), &query, &self.config).await {
            Ok(candidates) => self.settle_success(&query, generation, candidates),
            Err(err) => self.settle_failure(&query, generation, err),
        }
    }

    fn settle_success(&self, query: &str, generation: u64, candidates: Vec<Candidate>) {
        #[cfg(feature = "perf-log")]
        let t0 = std::time::Instant::now();

        let suggestions = rank(candidates, &analyze(query), self.config.suggestion_limit as usize);

        #[cfg(feature = "perf-log")]
        tracing::debug!(
            elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0,
            shown = suggestions.len(),
            "[perf] rank"
        );

        // No keystroke can land between this check and the emit below.
        let _output = self.output.lock();
        let live = self.input.current_query();

        let current = {
            let mut session = self.session.lock();
            if session.state == PipelineState::Disposed {
                return;
            }
            let latest = self.generation.load(Ordering::SeqCst);
            let current = self.is_current(query, generation, latest, &live);
            if generation == latest {
                session.state = if current {
                    PipelineState::Resolved
                } else {
                    PipelineState::RejectedStale
                };
            }
            current
        };

        if !current {
            debug!(query = %query, live = %live.trim(), generation, "discarding stale result");
            return;
        }

        self.emit(suggestions);
    }

    /// Failures are recovered with the built-in list for the last requested
    /// query. This path has no staleness check.
    fn settle_failure(&self, query: &str, generation: u64, err: MarqueeError) {
        warn!(query = %query, generation, error = %err, "lookup failed, showing fallback list");

        let _output = self.output.lock();
        let fallback_query = {
            let mut session = self.session.lock();
            if session.state == PipelineState::Disposed {
                return;
            }
            if generation == self.generation.load(Ordering::SeqCst) {
                session.state = PipelineState::Failed;
            }
            session
                .last_requested
                .clone()
                .unwrap_or_else(|| query.to_string())
        };

        self.emit(fallback_suggestions(&fallback_query));
    }

    fn is_current(&self, query: &str, generation: u64, latest: u64, live: &str) -> bool {
        let text_matches = live.trim() == query;
        match self.config.staleness {
            StalenessCheck::QueryText => text_matches,
            StalenessCheck::Generation => generation == latest && text_matches,
        }
    }

    fn emit(&self, suggestions: Vec<Suggestion>) {
        if suggestions.is_empty() {
            self.sink.show_empty();
        } else {
            self.sink.show_suggestions(suggestions);
        }
    }

    fn dispose(&self) {
        let _output = self.output.lock();
        let mut session = self.session.lock();
        if session.state == PipelineState::Disposed {
            return;
        }
        if let Some(timer) = session.timer.take() {
            timer.cancel();
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        session.state = PipelineState::Disposed;
        drop(session);
        debug!(generation, "pipeline disposed");
    }
}
