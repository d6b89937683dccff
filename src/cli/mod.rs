//! CLI adapter for Tessera
//!
//! Command-line access to the index registry: inspect, create and delete
//! indexes, try analyzers, and show the effective configuration. The
//! adapter depends on `core/`; nothing in `core/` depends on it.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

/// Tessera - index registry for full-text search
///
/// Restores index definitions from the data directory and manages
/// their Tantivy writers.
#[derive(Parser, Debug)]
#[command(name = "tessera")]
#[command(version)]
#[command(about = "Index registry and writer lifecycle for full-text search", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for scripting
    Json,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List all registered indexes
    #[command(name = "list-indexes")]
    ListIndexes(commands::index::ListArgs),

    /// Show settings, mappings and statistics of an index
    #[command(name = "get-index-info")]
    GetIndexInfo(commands::index::InfoArgs),

    /// Create a new index
    #[command(name = "create-index")]
    CreateIndex(commands::index::CreateArgs),

    /// Delete an index and all of its data
    #[command(name = "delete-index")]
    DeleteIndex(commands::index::DeleteArgs),

    /// Run text through an analyzer and print the tokens
    Analyze(commands::AnalyzeArgs),

    /// Show current configuration
    #[command(name = "show-config")]
    ShowConfig(commands::ConfigArgs),

    /// Generate shell completion scripts
    ///
    /// Output completion script to stdout. To install:
    ///
    ///   bash:  tessera completions bash > ~/.local/share/bash-completion/completions/tessera
    ///   zsh:   tessera completions zsh > ~/.zfunc/_tessera
    ///   fish:  tessera completions fish > ~/.config/fish/completions/tessera.fish
    Completions(commands::CompletionsArgs),
}

/// Install the tracing subscriber on stderr.
///
/// `RUST_LOG` wins over the default `tessera=info` filter.
pub fn init_logging(json: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "tessera=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

/// Run the CLI with the provided arguments
pub fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    use crate::core::config::Config;
    use crate::core::services::Services;
    use crate::core::xdg::XdgDirs;
    use std::sync::Arc;

    // Handle completions command early (doesn't need services)
    if let Commands::Completions(args) = cli.command {
        return commands::completions::execute(args);
    }

    // Initialize XDG directories
    let xdg = XdgDirs::new();
    xdg.ensure_dirs_exist()?;
    xdg.log_paths();

    // Load configuration
    let config = Config::load_with_xdg(&xdg)?;
    config.log_config();

    // Create services and restore persisted indexes
    let services = Arc::new(Services::new(config));
    services.load_indexes()?;

    let result = match cli.command {
        Commands::ListIndexes(args) => commands::index::execute_list(args, &services, cli.format),
        Commands::GetIndexInfo(args) => commands::index::execute_info(args, &services, cli.format),
        Commands::CreateIndex(args) => commands::index::execute_create(args, &services, cli.format),
        Commands::DeleteIndex(args) => commands::index::execute_delete(args, &services, cli.format),
        Commands::Analyze(args) => commands::analyze::execute(args, &services, cli.format),
        Commands::ShowConfig(args) => commands::config::execute(args, &services, cli.format),
        Commands::Completions(_) => unreachable!(), // Handled above
    };

    // Persist refreshed statistics and release writers before exiting
    services.shutdown()?;
    result
}
