//! codesearch CLI - validated semantic code search and hallucination
//! detection.
//!
//! # Usage
//!
//! ```bash
//! # Rebuild the code examples for a repository
//! codesearch index acme/widgets
//!
//! # Search for code patterns
//! codesearch search "parse a config file"
//!
//! # Check a script for hallucinated API usage
//! codesearch check script.py
//!
//! # Inspect backend health
//! codesearch health
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use codesearch_config::{ConfigLoader, ConfigOverrides};

mod commands;
mod progress;

/// codesearch - validated semantic code search and hallucination detection
#[derive(Parser, Debug)]
#[command(name = "codesearch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOptions,
}

/// Global options available to all commands.
#[derive(Args, Debug, Clone)]
struct GlobalOptions {
    /// Workspace directory holding `.codesearch/config.toml`.
    #[arg(long, short = 'w', global = true, default_value = ".")]
    workspace: PathBuf,

    /// Enable verbose logging.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Suppress non-essential output.
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Qdrant server URL.
    #[arg(long, global = true, env = "CODESEARCH_QDRANT_URL")]
    qdrant_url: Option<String>,

    /// Remote graph store base URL; omit to use the in-process store.
    #[arg(long, global = true, env = "CODESEARCH_GRAPH_URL")]
    graph_url: Option<String>,

    /// Embedding dimension override.
    #[arg(long, global = true)]
    embedding_dim: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl GlobalOptions {
    fn to_config_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            qdrant_url: self.qdrant_url.clone(),
            graph_url: self.graph_url.clone(),
            log_level: if self.quiet {
                Some("error".to_string())
            } else if self.verbose {
                Some("debug".to_string())
            } else {
                None
            },
            embedding_dim: self.embedding_dim,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validated semantic search over indexed code (§4.J).
    Search(commands::search::SearchArgs),

    /// Rebuild the indexed code examples for a repository (§4.G).
    Index(commands::index::IndexArgs),

    /// Check a Python script for hallucinated API usage (§4.K).
    Check(commands::check::CheckArgs),

    /// Report backend and cache health (§4.L).
    Health(commands::health::HealthArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.global.quiet {
        Level::ERROR
    } else if cli.global.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let overrides = cli.global.to_config_overrides();
    let mut loader = ConfigLoader::new();
    let config = loader.load(&cli.global.workspace, Some(&overrides))?;

    let services = commands::build_services(&config).await?;
    let format = cli.global.format;

    match cli.command {
        Commands::Search(args) => commands::search::execute(args, &services, format).await,
        Commands::Index(args) => commands::index::execute(args, &services).await,
        Commands::Check(args) => commands::check::execute(args, &services, format).await,
        Commands::Health(args) => commands::health::execute(args, &services, format).await,
    }
}
