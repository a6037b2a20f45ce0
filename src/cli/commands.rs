//! CLI command definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(name = "eventpulse")]
#[command(about = "EventPulse: talent recommendations from a retrieval-augmented chat pipeline")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: level from config)
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to the TOML config (default: config.toml, then config.example.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask for a single talent recommendation
    Ask {
        /// What kind of talent you are looking for
        query: String,
        /// City the talent should be based in
        #[arg(long)]
        city: String,
        /// Print full source documents instead of previews
        #[arg(long)]
        full_sources: bool,
    },
    /// Start an interactive chat session
    Chat {
        /// City used for every request until changed with `/city`
        #[arg(long)]
        city: String,
    },
    /// Start the HTTP API server
    Serve {
        /// Host to bind to (default: from config)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind to (default: from config)
        #[arg(short, long)]
        port: Option<u16>,
        /// Enable CORS for all origins
        #[arg(long)]
        cors: bool,
    },
    /// List the cities offered by the selector
    Cities,
    /// Show current configuration
    Config,
}
