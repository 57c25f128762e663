use clap::{Parser, Subcommand};
use insight_core::labels::Labels;
use insight_core::QueryMatch;
use insight_index::{EmbeddingProvider, HashEmbedding, SummaryIndex};
use insight_query::{PrefixStripRewriter, QueryEngine, QueryOptions};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "insight", about = "Insight — semantic business summary index")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "insight.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a fresh index from an initial summary batch
    Build {
        /// Base path of the index artifact pair
        #[arg(short, long)]
        index: PathBuf,
        /// Input file with one summary per line
        #[arg(long)]
        input: PathBuf,
    },
    /// Append a producer's summary batch to an existing index
    Update {
        /// Base path of the index artifact pair
        #[arg(short, long)]
        index: PathBuf,
        /// Input file with one summary per line
        #[arg(long)]
        input: PathBuf,
    },
    /// Answer a question, or start an interactive prompt when none is given
    Query {
        /// Base path of the index artifact pair
        #[arg(short, long)]
        index: PathBuf,
        /// The question to answer (omit for an interactive session)
        question: Option<String>,
        /// How many results to retrieve (overrides config)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
        /// Keep only results with this domain label
        #[arg(long)]
        domain: Option<String>,
        /// Keep only results with this tag label
        #[arg(long)]
        tag: Option<String>,
        /// Rephrase the top result for readability
        #[arg(long)]
        rewrite: bool,
        /// Print the result list as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show record count, dimension, and per-label record counts
    Stats {
        /// Base path of the index artifact pair
        #[arg(short, long)]
        index: PathBuf,
    },
}

#[derive(Deserialize, Default)]
struct InsightConfig {
    #[serde(default)]
    embedding: EmbeddingConfig,
    #[serde(default)]
    query: QueryConfig,
}

#[derive(Deserialize)]
struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    provider: String,
    #[serde(default = "default_dimension")]
    dimension: usize,
    #[serde(default)]
    endpoint: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            dimension: default_dimension(),
            endpoint: String::new(),
        }
    }
}

#[derive(Deserialize)]
struct QueryConfig {
    #[serde(default = "default_top_k")]
    top_k: usize,
    #[serde(default)]
    rewrite: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            rewrite: false,
        }
    }
}

fn default_provider() -> String {
    "hash".to_string()
}
fn default_dimension() -> usize {
    256
}
fn default_top_k() -> usize {
    5
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config).await?;
    let embedder = make_embedder(&config.embedding)?;

    match cli.command {
        Commands::Build { index, input } => {
            let summaries = read_summaries(&input).await?;
            let built = SummaryIndex::build(&index, summaries, embedder.as_ref()).await?;
            println!(
                "Built index at '{}' with {} record(s), dimension {}",
                index.display(),
                built.len(),
                built.dimension()
            );
        }
        Commands::Update { index, input } => {
            let summaries = read_summaries(&input).await?;
            let mut opened = SummaryIndex::open(&index).await?;
            let start = opened.update(summaries, embedder.as_ref()).await?;
            println!(
                "Updated index at '{}': new records start at position {}, {} record(s) total",
                index.display(),
                start,
                opened.len()
            );
        }
        Commands::Query {
            index,
            question,
            top_k,
            domain,
            tag,
            rewrite,
            json,
        } => {
            let opened = SummaryIndex::open(&index).await?;
            info!(records = opened.len(), "index loaded");

            let mut engine = QueryEngine::new(opened, embedder);
            let rewrite = rewrite || config.query.rewrite;
            if rewrite {
                engine = engine.with_rewriter(Arc::new(PrefixStripRewriter));
            }

            let options = QueryOptions {
                top_k: top_k.unwrap_or(config.query.top_k),
                domain,
                tag,
                rewrite,
            };

            match question {
                Some(question) => {
                    let matches = engine.query(&question, &options).await?;
                    print_matches(&matches, json)?;
                }
                None => interactive_loop(&engine, &options, json).await?,
            }
        }
        Commands::Stats { index } => {
            let opened = SummaryIndex::open(&index).await?;
            print_stats(&opened);
        }
    }

    Ok(())
}

async fn load_config(path: &Path) -> anyhow::Result<InsightConfig> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => toml::from_str(&text).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        }),
        // A missing config file just means defaults; any other read failure
        // is a real error.
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(InsightConfig::default()),
        Err(e) => Err(anyhow::anyhow!(
            "Failed to read config file '{}': {}",
            path.display(),
            e
        )),
    }
}

fn make_embedder(config: &EmbeddingConfig) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    if config.dimension == 0 {
        anyhow::bail!("[embedding] dimension must be positive");
    }
    match config.provider.as_str() {
        "hash" => Ok(Arc::new(HashEmbedding::new(config.dimension))),
        #[cfg(feature = "http-embeddings")]
        "http" => {
            if config.endpoint.is_empty() {
                anyhow::bail!("embedding provider 'http' requires [embedding] endpoint");
            }
            Ok(Arc::new(insight_index::HttpEmbedding::new(
                config.endpoint.clone(),
                config.dimension,
            )))
        }
        #[cfg(not(feature = "http-embeddings"))]
        "http" => anyhow::bail!(
            "embedding provider 'http' requires building with the http-embeddings feature"
        ),
        other => anyhow::bail!("unknown embedding provider '{other}' (expected 'hash' or 'http')"),
    }
}

/// Read one summary per line, skipping blank lines.
async fn read_summaries(path: &Path) -> anyhow::Result<Vec<String>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read input file '{}': {}", path.display(), e))?;
    Ok(parse_summary_lines(&text))
}

fn parse_summary_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

async fn interactive_loop(
    engine: &QueryEngine,
    options: &QueryOptions,
    json: bool,
) -> anyhow::Result<()> {
    println!(
        "Ask about the {} indexed summaries ('exit' or 'quit' to leave).",
        engine.index().len()
    );
    let stdin = std::io::stdin();
    loop {
        print!("? ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            break;
        }

        match engine.query(question, options).await {
            Ok(matches) => print_matches(&matches, json)?,
            Err(e) => eprintln!("query failed: {e}"),
        }
    }
    Ok(())
}

fn print_matches(matches: &[QueryMatch], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(matches)?);
        return Ok(());
    }
    if matches.is_empty() {
        println!("No matching summaries.");
        return Ok(());
    }
    for (rank, m) in matches.iter().enumerate() {
        println!(
            "{}. [{}/{}] score {:.4}",
            rank + 1,
            m.domain,
            m.tag,
            m.score
        );
        println!("   {}", m.summary);
    }
    Ok(())
}

fn print_stats(index: &SummaryIndex) {
    println!("Records:   {}", index.len());
    println!("Dimension: {}", index.dimension());

    let mut domains: BTreeMap<String, usize> = BTreeMap::new();
    let mut tags: BTreeMap<String, usize> = BTreeMap::new();
    for summary in index.summaries().iter() {
        let labels = Labels::parse(summary);
        *domains.entry(labels.domain).or_insert(0) += 1;
        *tags.entry(labels.tag).or_insert(0) += 1;
    }

    println!("Domains:");
    for (domain, count) in &domains {
        println!("  {domain}: {count}");
    }
    println!("Tags:");
    for (tag, count) in &tags {
        println!("  {tag}: {count}");
    }
}
