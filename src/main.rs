use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use newsfts::api::create_router;
use newsfts::{EngineConfig, SearchEngine, SearchHit, SearchOptions, StopwordSource, TokenizerKind};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

// CLI Arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "TF-IDF news search with recency ranking", long_about = None)]
struct Args {
    /// JSON config file; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory of JSON article records
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Stopword file, one term per line
    #[arg(short, long)]
    stopwords: Option<PathBuf>,

    #[arg(short, long, value_enum)]
    tokenizer: Option<TokenizerArg>,

    /// Snapshot output path
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Do not write an index snapshot
    #[arg(long, conflicts_with = "snapshot")]
    no_snapshot: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum TokenizerArg {
    Simple,
    Segmenting,
    Stemming,
}

impl From<TokenizerArg> for TokenizerKind {
    fn from(arg: TokenizerArg) -> Self {
        match arg {
            TokenizerArg::Simple => TokenizerKind::Simple,
            TokenizerArg::Segmenting => TokenizerKind::Segmenting,
            TokenizerArg::Stemming => TokenizerKind::Stemming,
        }
    }
}

#[derive(clap::Args, Debug, Clone)]
struct QueryArgs {
    #[arg(short = 'k', long, default_value_t = 5, allow_negative_numbers = true)]
    top_k: i64,

    /// Weight of recency in [0, 1]
    #[arg(short = 'w', long, default_value_t = 0.0)]
    date_weight: f64,

    /// Truncate content to this many characters
    #[arg(short, long, default_value_t = 200)]
    preview: usize,
}

impl QueryArgs {
    fn options(&self) -> SearchOptions {
        SearchOptions {
            top_k: self.top_k,
            date_weight: self.date_weight,
            preview_chars: Some(self.preview),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the index and print statistics
    Build,
    /// Run a single query
    Search {
        query: String,
        #[command(flatten)]
        query_args: QueryArgs,
    },
    /// Read queries from stdin, one per line
    Shell {
        #[command(flatten)]
        query_args: QueryArgs,
    },
    /// Serve the HTTP API
    Serve {
        #[arg(short, long, default_value = "127.0.0.1:3000")]
        addr: String,
    },
}

fn load_config(args: &Args) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(data) = &args.data {
        config.data_dir = data.clone();
    }
    if let Some(stopwords) = &args.stopwords {
        config.stopwords = StopwordSource::File(stopwords.clone());
    }
    if let Some(tokenizer) = args.tokenizer {
        config.tokenizer = tokenizer.into();
    }
    if let Some(path) = &args.snapshot {
        config.set_snapshot_path(path.clone());
    }
    if args.no_snapshot {
        config.snapshot = None;
    }
    Ok(config)
}

fn open_engine(config: EngineConfig) -> Result<SearchEngine> {
    let start = Instant::now();
    let data_dir = config.data_dir.clone();
    let engine = SearchEngine::open(config)
        .with_context(|| format!("Failed to build index from {}", data_dir.display()))?;
    println!(
        "Indexed {} documents in {:?}",
        engine.document_count(),
        start.elapsed()
    );
    Ok(engine)
}

fn print_hits(out: &mut impl Write, hits: &[SearchHit]) -> io::Result<()> {
    if hits.is_empty() {
        writeln!(out, "No results found.")?;
        return Ok(());
    }

    for (i, hit) in hits.iter().enumerate() {
        writeln!(out, "\n{}. {}", i + 1, hit.title)?;
        writeln!(
            out,
            "Score: {} (content {:.4}, date {:.4})",
            hit.formatted_score(),
            hit.content_score,
            hit.date_score
        )?;
        writeln!(out, "Date: {}", hit.date.as_deref().unwrap_or("-"))?;
        writeln!(out, "{}", hit.content)?;
        writeln!(out, "{}", "-".repeat(80))?;
    }
    Ok(())
}

fn run_shell(engine: &SearchEngine, options: &SearchOptions) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    write!(stdout, "> ")?;
    stdout.flush()?;

    for line in stdin.lock().lines() {
        let line = line?;
        let query = line.trim();
        if !query.is_empty() {
            let start = Instant::now();
            let hits = engine.search(query, options);
            print_hits(&mut stdout, &hits)?;
            writeln!(stdout, "({:?})", start.elapsed())?;
        }
        write!(stdout, "> ")?;
        stdout.flush()?;
    }
    Ok(())
}

async fn serve(engine: Arc<SearchEngine>, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(addr, "serving search API");
    axum::serve(listener, create_router(engine))
        .await
        .context("Server error")
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("newsfts=info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    match args.command {
        Command::Build => {
            let engine = open_engine(config)?;
            let stats = engine.stats();
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::Search { query, query_args } => {
            let engine = open_engine(config)?;
            println!("Searching for: \"{}\"", query);
            let hits = engine.search(&query, &query_args.options());
            print_hits(&mut io::stdout(), &hits)?;
        }
        Command::Shell { query_args } => {
            let engine = open_engine(config)?;
            run_shell(&engine, &query_args.options())?;
        }
        Command::Serve { addr } => {
            let engine = Arc::new(open_engine(config)?);
            let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
            runtime.block_on(serve(engine, &addr))?;
        }
    }

    Ok(())
}
