use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;
use tracing::{info, warn};

use nw_core::{
    ArticleStore, ChatTurn, Error, IngestConfig, Result, RetrievalConfig, SourceConfig,
    StoreStatus, ThrottlePolicy,
};
use nw_inference::{create_model, ModelConfig, ModelHandles};
use nw_ingest::{HttpFetcher, IngestionPipeline};
use nw_retrieval::RetrievalOrchestrator;
use nw_storage::{create_store, MemoryCache, MemoryStore};
use nw_web::{create_app, AppState};

#[derive(Debug, Clone)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    // "1h", "30m", "1h15m30s"; a bare number means seconds.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();

        for c in s.chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if !c.is_whitespace() {
                let num: u64 = current_number
                    .parse()
                    .map_err(|_| format!("expected a number before '{}'", c))?;
                let unit = match c {
                    's' => 1,
                    'm' => 60,
                    'h' => 3600,
                    'd' => 86400,
                    _ => return Err(format!("invalid duration unit: {}", c)),
                };
                total_seconds += num * unit;
                current_number.clear();
            }
        }

        if !current_number.is_empty() {
            total_seconds += current_number
                .parse::<u64>()
                .map_err(|_| "invalid number in duration".to_string())?;
        }

        if total_seconds == 0 {
            return Err("duration must be non-zero".to_string());
        }
        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Debug, Deserialize)]
struct FileConfig {
    sources: Vec<SourceConfig>,
    #[serde(default)]
    max_items_per_source: Option<usize>,
    #[serde(default)]
    source_delay_secs: Option<u64>,
}

fn load_ingest_config(path: &Path) -> Result<IngestConfig> {
    let raw = std::fs::read_to_string(path)?;
    let file: FileConfig = serde_json::from_str(&raw)?;

    let mut config = IngestConfig {
        sources: file.sources,
        ..IngestConfig::default()
    };
    if let Some(max) = file.max_items_per_source {
        config.max_items_per_source = max;
    }
    if let Some(secs) = file.source_delay_secs {
        config.throttle = ThrottlePolicy::Fixed(Duration::from_secs(secs));
    }
    Ok(config)
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Conversational news retrieval service", long_about = None)]
struct Cli {
    /// Vector store backend: memory (default) or qdrant (with the qdrant feature)
    #[arg(long, default_value = "memory")]
    storage: String,
    #[arg(long)]
    storage_url: Option<String>,
    /// Model backend: ollama (default) or dummy (offline)
    #[arg(long, default_value = "ollama")]
    model: String,
    #[arg(long)]
    model_url: Option<String>,
    /// JSON file with the feed source list
    #[arg(long, default_value = "sources.json")]
    config: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the ingestion pipeline, once or on an interval
    Ingest {
        /// Re-run periodically (e.g. 1h, 30m, 1h15m30s)
        #[arg(long)]
        interval: Option<HumanDuration>,
    },
    /// Ask a one-shot question through the retrieval pipeline
    Query { text: String },
    /// Start the HTTP API
    Serve {
        #[arg(long, default_value = "0.0.0.0:3000")]
        addr: String,
    },
    /// Show article store statistics
    Stats,
}

/// Probe the configured store once at startup. A store that cannot be
/// reached downgrades the service to degraded mode instead of aborting:
/// queries then get the fixed advisory response.
async fn build_store(cli: &Cli, dimension: usize) -> (Arc<dyn ArticleStore>, StoreStatus) {
    match create_store(&cli.storage, cli.storage_url.as_deref(), dimension).await {
        Ok(store) => match store.stats().await {
            Ok(stats) => {
                info!("🏦 store ready ({}, {} articles)", cli.storage, stats.count);
                (store, StoreStatus::Available)
            }
            Err(e) => {
                warn!("store health check failed, degrading: {}", e);
                (store, StoreStatus::Unavailable)
            }
        },
        Err(e) => {
            warn!("store connection failed, degrading: {}", e);
            (Arc::new(MemoryStore::new()), StoreStatus::Unavailable)
        }
    }
}

fn build_model(cli: &Cli) -> Result<ModelHandles> {
    let config = ModelConfig {
        base_url: cli.model_url.clone(),
        ..ModelConfig::default()
    };
    create_model(&cli.model, &config)
}

fn build_orchestrator(
    handles: ModelHandles,
    store: Arc<dyn ArticleStore>,
    status: StoreStatus,
) -> RetrievalOrchestrator {
    RetrievalOrchestrator::new(
        handles.embedder,
        handles.generator,
        store,
        Arc::new(MemoryCache::new()),
        RetrievalConfig::default(),
        status,
    )
}

async fn run_ingest_once(
    handles: &ModelHandles,
    store: &Arc<dyn ArticleStore>,
    config: &IngestConfig,
) -> Result<()> {
    let fetcher = Arc::new(HttpFetcher::new()?);
    let pipeline = IngestionPipeline::new(
        fetcher,
        handles.embedder.clone(),
        store.clone(),
        config.clone(),
    );
    let report = pipeline.run().await?;
    info!(
        "📦 run report: collected={} stored={} skipped_sources={} categories={:?} regions={:?}",
        report.collected, report.stored, report.skipped_sources, report.categories, report.regions
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let handles = build_model(&cli)?;
    info!("🧠 model backend ready ({})", cli.model);
    let dimension = handles.embedder.dimension();

    match &cli.command {
        Commands::Ingest { interval } => {
            let config = load_ingest_config(&cli.config)?;
            let (store, status) = build_store(&cli, dimension).await;
            if status == StoreStatus::Unavailable {
                return Err(Error::Storage(
                    "cannot ingest into an unavailable store".to_string(),
                ));
            }

            if let Some(HumanDuration(every)) = interval {
                info!("⏲️ periodic ingestion every {}s", every.as_secs());
                loop {
                    if let Err(e) = run_ingest_once(&handles, &store, &config).await {
                        warn!("ingestion cycle failed: {}", e);
                    }
                    tokio::time::sleep(*every).await;
                }
            } else {
                run_ingest_once(&handles, &store, &config).await?;
            }
        }
        Commands::Query { text } => {
            let (store, status) = build_store(&cli, dimension).await;
            let orchestrator = build_orchestrator(handles, store, status);

            let history: Vec<ChatTurn> = Vec::new();
            let outcome = orchestrator.answer(text, &history).await?;
            println!("{}", outcome.text);
            if !outcome.sources.is_empty() {
                println!("\nSources:");
                for article in &outcome.sources {
                    println!("  - {} ({})", article.title, article.url);
                }
            }
        }
        Commands::Serve { addr } => {
            let (store, status) = build_store(&cli, dimension).await;
            let orchestrator = build_orchestrator(handles, store.clone(), status);
            let app = create_app(AppState {
                orchestrator,
                store,
            });

            info!("🚀 listening on {}", addr);
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
        Commands::Stats => {
            let (store, _status) = build_store(&cli, dimension).await;
            let stats = store.stats().await?;
            println!("articles: {}", stats.count);
            println!("status: {:?}", stats.status);
        }
    }

    Ok(())
}
