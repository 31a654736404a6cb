//! Demo server for the http-responder library.
//!
//! ```text
//! client ─▶ TraceLayer ─▶ cors ─▶ content_type ─▶ output_buffering ─▶ demo handlers
//!                                                                      (Responder)
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use http_responder::config::{config_warnings, load_config, AppConfig};
use http_responder::observability::{logging, metrics};
use http_responder::HttpServer;

#[derive(Parser)]
#[command(name = "http-responder")]
#[command(about = "Demo server for the responder and its middlewares", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `server.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }

    logging::init(&config.observability);
    tracing::info!("http-responder v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.server.bind_address,
        files_dir = %config.server.files_dir,
        cors_origins = ?config.cors.origins,
        buffer_mode = ?config.output_buffering.mode,
        "Configuration loaded"
    );
    for warning in config_warnings(&config) {
        tracing::warn!("{warning}");
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
