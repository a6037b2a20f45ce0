use clap::Parser;
use eventpulse::cli::handle_ask;
use eventpulse::cli::handle_chat;
use eventpulse::cli::handle_serve;
use eventpulse::cli::print_cities;
use eventpulse::cli::print_config;
use eventpulse::cli::Cli;
use eventpulse::cli::Commands;
use eventpulse::AppConfig;
use eventpulse::Result;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::load()?,
    };

    if config.logging.backtrace && std::env::var_os("RUST_BACKTRACE").is_none() {
        std::env::set_var("RUST_BACKTRACE", "1");
    }

    eventpulse::logging::init_cli_logging(&config, cli.verbose)?;
    info!("Configuration loaded successfully");

    match cli.command {
        Commands::Ask {
            query,
            city,
            full_sources,
        } => {
            handle_ask(&config, &query, &city, full_sources).await?;
        }
        Commands::Chat { city } => {
            handle_chat(&config, &city).await?;
        }
        Commands::Serve { host, port, cors } => {
            handle_serve(&config, host, port, cors).await?;
        }
        Commands::Cities => {
            print_cities(&config.surface.cities);
        }
        Commands::Config => {
            print_config(&config);
        }
    }

    Ok(())
}
