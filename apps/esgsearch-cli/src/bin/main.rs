use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use esgsearch_core::config::{expand_path, Config, Settings};
use esgsearch_core::data_processor::RecordLoader;
use esgsearch_core::types::{IndexReport, SearchMode};
use esgsearch_embed::build_embedder;
use esgsearch_hybrid::HybridSearchEngine;
use esgsearch_query::{KnowledgeBase, QueryProcessor};
use esgsearch_text::LexicalIndex;
use esgsearch_vector::VectorIndex;

type Engine = HybridSearchEngine<LexicalIndex, VectorIndex>;

/// Hybrid search over sustainability documents
#[derive(Parser, Debug)]
#[command(name = "esgsearch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Index collector records and run hybrid keyword/vector search with query understanding", long_about = None)]
struct Cli {
    /// Directory holding config.toml and config.<env>.toml
    #[arg(global = true, long = "config-dir")]
    config_dir: Option<PathBuf>,

    /// Knowledge base JSON replacing the built-in vocabulary
    #[arg(global = true, long = "kb")]
    knowledge_base: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show entities, intents, expansion and variations for a query
    Understand {
        #[arg(value_name = "QUERY")]
        query: String,
    },

    /// Load records and report what was indexed, skipped and degraded
    Index {
        /// File or directory of .json / .jsonl collector records
        #[arg(long = "data")]
        data: String,
    },

    /// Load records, index them and search
    Search {
        #[arg(long = "data")]
        data: String,

        /// keyword, vector or hybrid (unknown values fall back to hybrid)
        #[arg(long = "mode")]
        mode: Option<String>,

        #[arg(long = "limit")]
        limit: Option<usize>,

        /// Search with the expanded query
        #[arg(long = "expand")]
        expand: bool,

        #[arg(value_name = "QUERY")]
        query: String,
    },

    /// Load records, index them and print index statistics
    Stats {
        #[arg(long = "data")]
        data: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config_dir.as_deref())?;
    let settings = config.settings()?;
    tracing::debug!(env = config.env_name(), provider = ?settings.embedding.provider, "configuration loaded");

    match cli.command {
        Commands::Understand { query } => {
            let processor = query_processor(cli.knowledge_base.as_deref())?;
            print_json(&processor.process(&query))?;
        }
        Commands::Index { data } => {
            let (_, report) = build_engine(&settings, &data)?;
            print_json(&report)?;
        }
        Commands::Search { data, mode, limit, expand, query } => {
            let (engine, _) = build_engine(&settings, &data)?;
            let mode = mode.as_deref().map(SearchMode::parse).unwrap_or(settings.search.default_mode);
            let limit = settings.search.effective_limit(limit);
            let results = if expand || settings.search.expand_queries {
                let processor = query_processor(cli.knowledge_base.as_deref())?;
                let processed = processor.process(&query);
                tracing::info!(expanded = %processed.expanded, "searching with expanded query");
                engine.search_processed(&processed, mode, limit)?
            } else {
                engine.search(&query, mode, limit)?
            };
            print_json(&results)?;
        }
        Commands::Stats { data } => {
            let (engine, _) = build_engine(&settings, &data)?;
            print_json(&engine.stats())?;
        }
    }
    Ok(())
}

fn load_config(dir: Option<&Path>) -> anyhow::Result<Config> {
    match dir {
        Some(dir) => {
            let env_name = std::env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
            Config::load_from(dir, &env_name).with_context(|| format!("loading config from {}", dir.display()))
        }
        None => Config::load().context("loading config"),
    }
}

fn query_processor(kb_path: Option<&str>) -> anyhow::Result<QueryProcessor> {
    let kb = match kb_path {
        Some(path) => KnowledgeBase::from_path(&expand_path(path))?,
        None => KnowledgeBase::builtin(),
    };
    Ok(QueryProcessor::new(Arc::new(kb))?)
}

fn build_engine(settings: &Settings, data: &str) -> anyhow::Result<(Engine, IndexReport)> {
    let path = expand_path(data);
    let loaded = RecordLoader::new()
        .load_path(&path)
        .with_context(|| format!("loading records from {}", path.display()))?;
    let documents = loaded.into_documents();

    let embedder = build_embedder(&settings.embedding)?;
    let engine = HybridSearchEngine::from_settings(&settings.search, embedder);

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("indexing {} documents", documents.len()));
    let report = engine.index_documents(documents);
    pb.finish_with_message(format!(
        "indexed {} documents ({} skipped, {} lexical-only)",
        report.indexed_count(),
        report.skipped_count(),
        report.degraded_count()
    ));
    Ok((engine, report))
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
