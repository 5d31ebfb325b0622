use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::{eyre, Context};
use plaxt_config::{open_store, Config};
use plaxt_core::ScrobblePipeline;
use plaxt_sources::{TraktClient, TraktSettings};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

mod logging;
mod server;

#[derive(Parser)]
#[command(name = "plaxt")]
#[command(about = "Plaxt - Scrobble Plex plays to Trakt")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true, env = "PLAXT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the webhook server (default)
    Serve {
        /// Address to listen on, overrides LISTEN and server.listen
        #[arg(long)]
        listen: Option<String>,
    },
    /// Check that the credential store is reachable and exit
    Healthcheck,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())
        .map_err(|e| eyre!("{:#}", e))
        .context("Failed to load configuration")?;

    logging::init_logging(cli.verbose, cli.quiet, &config.logging)
        .map_err(|e| eyre!("{:#}", e))
        .context("Failed to initialize logging")?;

    match cli.command.unwrap_or(Commands::Serve { listen: None }) {
        Commands::Serve { listen } => {
            if let Some(listen) = listen {
                config.server.listen = listen;
            }
            run_server(config).await
        }
        Commands::Healthcheck => run_healthcheck(config).await,
    }
}

async fn run_server(config: Config) -> color_eyre::Result<()> {
    config.validate().map_err(|e| eyre!("{:#}", e))?;

    let store = open_store(&config.storage)
        .await
        .context("Failed to open credential store")?;
    let trakt = TraktClient::new(TraktSettings {
        base_url: config.trakt.api_base_url.clone(),
        client_id: config.trakt.client_id.clone(),
        client_secret: config.trakt.client_secret.clone(),
        timeout: Duration::from_secs(config.trakt.timeout_secs),
    })
    .context("Failed to build Trakt client")?;

    let pipeline = Arc::new(ScrobblePipeline::new(
        store.clone(),
        Arc::new(trakt),
        chrono::Duration::days(config.trakt.refresh_after_days),
    ));

    let state = server::AppState {
        store,
        pipeline,
        client_id: config.trakt.client_id.clone(),
        allowed_hostnames: Arc::new(config.server.allowed_hostnames.clone()),
    };

    server::serve(state, &config.server.listen)
        .await
        .map_err(|e| eyre!("{:#}", e))
}

async fn run_healthcheck(config: Config) -> color_eyre::Result<()> {
    let store = open_store(&config.storage)
        .await
        .context("Failed to open credential store")?;

    match server::health::check_storage(store.as_ref()).await {
        Ok(()) => {
            info!(backend = store.backend_name(), "OK");
            Ok(())
        }
        Err(message) => {
            error!(backend = store.backend_name(), error = %message, "Service Unavailable");
            Err(eyre!("storage: {}", message))
        }
    }
}
