//! Demo server for the `served-log` request logger.
//!
//! Serves `/ping` and `/hello` with every request logged as a `req_start`
//! and `req_served` event pair.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use served_log::config::resolve_config;
use served_log::http::HttpServer;
use served_log::observability::{build_sink, init_logging};

#[derive(Parser)]
#[command(name = "served-log")]
#[command(about = "HTTP server with structured request/response logging", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `server.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = resolve_config(cli.config.as_deref(), cli.bind.as_deref())?;

    init_logging(&config.logging)?;

    tracing::info!(
        app = %config.app_name,
        bind_address = %config.server.bind_address,
        request_timeout_secs = config.server.request_timeout_secs,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    let sink = build_sink(&config.logging);

    let server = HttpServer::new(config, sink);
    server.run(listener).await?;

    Ok(())
}
