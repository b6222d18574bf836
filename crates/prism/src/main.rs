//! Prism CLI - bulk image resize, rotate, and format conversion.
//!
//! Prism mirrors a source directory tree into a destination tree, applying
//! the same transformation to every image with a pool of parallel workers.
//!
//! # Usage
//!
//! ```bash
//! # Convert a tree to PNG, 1024px wide, rotated 90deg counter-clockwise
//! prism convert --from ./photos --to ./out -F png -W 1024 -R 90
//!
//! # Use 8 workers and write a JSON failure report
//! prism convert --from ./photos --to ./out --workers 8 --report report.json
//!
//! # View configuration
//! prism config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Prism - bulk image resize, rotate, and format conversion.
#[derive(Parser, Debug)]
#[command(name = "prism")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Transform every image under a directory into a mirrored tree
    Convert(cli::convert::ConvertArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    // Only logging falls back to defaults; `convert` refuses a broken config.
    let loaded = prism_core::Config::load();
    let logging_config = match &loaded {
        Ok(config) => config.clone(),
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Check your config file with `prism config check`."
            );
            prism_core::Config::default()
        }
    };
    logging::init_from_config(&logging_config, cli.verbose, cli.json_logs);

    tracing::debug!("Prism v{}", prism_core::VERSION);

    match cli.command {
        Commands::Convert(args) => cli::convert::execute(args, loaded).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
