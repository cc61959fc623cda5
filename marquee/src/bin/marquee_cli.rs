//! Command-line driver for the suggestion engine.
//!
//! Usage:
//!     marquee-cli suggest "blade runner 1982" --limit 5
//!     marquee-cli analyze "Interstellar 2014"
//!     marquee-cli type b ba bat batm batman --delay-ms 60
//!
//! Remote credentials come from MARQUEE_* environment variables.
//! Logs go to stderr; set RUST_LOG=marquee=debug to watch scheduling.

use anyhow::Result;
use clap::{Parser, Subcommand};
use marquee::fallback::fallback_suggestions;
use marquee::links::{search_page_url, DEFAULT_ORIGIN};
use marquee::query::analyze;
use marquee::remote::build_source;
use marquee::{
    fetch_ranked, MarqueeConfig, QuerySource, RemoteKind, Suggestion, SuggestionPipeline,
    SuggestionSink,
};
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "marquee-cli", about = "Film search suggestions from the terminal", version)]
struct Cli {
    /// Emit JSON instead of plain text.
    #[arg(long, global = true)]
    json: bool,

    /// Remote source to query (overrides MARQUEE_SOURCE).
    #[arg(long, global = true, value_parser = parse_source)]
    source: Option<RemoteKind>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one lookup and print the ranked suggestions.
    Suggest {
        /// What the user typed.
        query: String,
        /// Maximum number of suggestions.
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Show how a query is analyzed.
    Analyze {
        query: String,
    },
    /// Feed successive search-box states through a live pipeline.
    Type {
        /// Search-box text after each keystroke, in order.
        #[arg(required = true)]
        keystrokes: Vec<String>,
        /// Pause between keystrokes.
        #[arg(long, default_value_t = 60)]
        delay_ms: u64,
        /// How long to wait for lookups after the last keystroke.
        #[arg(long, default_value_t = 3_000)]
        settle_ms: u64,
    },
}

fn parse_source(value: &str) -> Result<RemoteKind, String> {
    value.parse().map_err(|e: marquee::MarqueeError| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("marquee=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = MarqueeConfig::from_env()?;
    if let Some(source) = cli.source {
        config.remote.source = source;
    }

    match cli.command {
        Command::Suggest { query, limit } => {
            if let Some(limit) = limit {
                config.suggestion_limit = limit;
            }
            handle_suggest(&config, &query, cli.json).await
        }
        Command::Analyze { query } => handle_analyze(&query, cli.json),
        Command::Type {
            keystrokes,
            delay_ms,
            settle_ms,
        } => handle_type(config, keystrokes, delay_ms, settle_ms).await,
    }
}

async fn handle_suggest(config: &MarqueeConfig, query: &str, as_json: bool) -> Result<()> {
    let source = build_source(config)?;
    info!(query, source = source.name(), "looking up suggestions");

    let (suggestions, fell_back) = match fetch_ranked(source.as_ref(), query.trim(), config).await {
        Ok(suggestions) => (suggestions, false),
        Err(err) => {
            warn!(error = %err, "lookup failed, showing fallback list");
            (fallback_suggestions(query), true)
        }
    };

    if as_json {
        let rows: Vec<_> = suggestions.iter().map(suggestion_json).collect();
        let doc = json!({ "query": query, "fallback": fell_back, "suggestions": rows });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    if suggestions.is_empty() {
        println!("No suggestions for \"{query}\".");
        return Ok(());
    }
    if fell_back {
        println!("(remote unavailable, built-in list)");
    }
    for (i, s) in suggestions.iter().enumerate() {
        let url = search_page_url(DEFAULT_ORIGIN.to_string(), s.search_query.clone())
            .unwrap_or_default();
        println!("{:>2}. {:<40} {:?}  {}", i + 1, s.label, s.kind, url);
    }
    Ok(())
}

fn handle_analyze(query: &str, as_json: bool) -> Result<()> {
    let info = analyze(query);
    if as_json {
        let doc = json!({
            "raw": info.raw,
            "clean_text": info.clean_text,
            "year": info.year,
            "tokens": info.tokens,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        println!("raw:        {:?}", info.raw);
        println!("clean_text: {:?}", info.clean_text);
        println!(
            "year:       {}",
            info.year.map(|y| y.to_string()).unwrap_or_else(|| "-".into())
        );
        println!("tokens:     {}", info.tokens.join(", "));
    }
    Ok(())
}

async fn handle_type(
    config: MarqueeConfig,
    keystrokes: Vec<String>,
    delay_ms: u64,
    settle_ms: u64,
) -> Result<()> {
    let sink = Arc::new(PrintingSink);
    let input = Arc::new(TerminalInput::default());
    let pipeline = SuggestionPipeline::new(config, sink, input.clone())?;

    for text in keystrokes {
        println!("> {text:?}");
        input.set(&text);
        pipeline.on_query_changed(text);
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    tokio::time::sleep(Duration::from_millis(settle_ms)).await;
    println!("state: {:?}", pipeline.state());
    pipeline.dispose();
    Ok(())
}

fn suggestion_json(s: &Suggestion) -> serde_json::Value {
    json!({
        "kind": format!("{:?}", s.kind).to_lowercase(),
        "label": s.label,
        "search_query": s.search_query,
        "url": search_page_url(DEFAULT_ORIGIN.to_string(), s.search_query.clone()),
    })
}

/// Prints adapter events as they arrive.
struct PrintingSink;

impl SuggestionSink for PrintingSink {
    fn show_loading(&self, query: String) {
        println!("  loading {query:?}");
    }

    fn show_suggestions(&self, suggestions: Vec<Suggestion>) {
        let labels: Vec<_> = suggestions.iter().map(|s| s.label.as_str()).collect();
        println!("  show [{}]", labels.join(" | "));
    }

    fn show_empty(&self) {
        println!("  hide");
    }
}

/// The simulated search box.
#[derive(Default)]
struct TerminalInput {
    text: Mutex<String>,
}

impl TerminalInput {
    fn set(&self, text: &str) {
        *self.text.lock() = text.to_string();
    }
}

impl QuerySource for TerminalInput {
    fn current_query(&self) -> String {
        self.text.lock().clone()
    }
}
