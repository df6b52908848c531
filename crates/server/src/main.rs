use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

mod api;
mod config;

use config::ServerConfig;

#[derive(Parser, Debug)]
#[command(name = "mcp-base")]
#[command(about = "MCP Base - uniform tool-calling over GitHub, n8n and friends", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "MCP_BASE_CONFIG", default_value = "mcp-base.toml")]
    config: PathBuf,

    /// Port to listen on (overrides the configuration file)
    #[arg(short, long, env = "MCP_BASE_PORT")]
    port: Option<u16>,

    /// Host to bind to (overrides the configuration file)
    #[arg(long, env = "MCP_BASE_HOST")]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mcp_base=info,tower_http=debug".into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    let args = Args::parse();

    tracing::info!("Starting MCP Base API");

    // Load configuration
    let config = ServerConfig::load(&args.config)?;

    // Start API server
    let addr = config.bind_addr(args.host.as_deref(), args.port);
    tracing::info!("Starting API server on {}", addr);

    api::serve(&addr, config).await?;

    Ok(())
}
