//! `dtmcp` - the Dynatrace MCP server binary
//!
//! Reads the environment configuration (optionally from a `.env` file),
//! builds the platform gateways, and serves the MCP tool set over stdio
//! until the client disconnects or a termination signal arrives.

use anyhow::{Context, Result};
use clap::Parser;
use dtmcp_api::{ApiState, DynatraceMcpServer};
use dtmcp_config::DynatraceEnv;
use dtmcp_logging::{init, LogConfig};
use rmcp::transport::stdio;
use rmcp::ServiceExt;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(
    name = "dtmcp",
    version,
    about = "Dynatrace MCP server: Grail DQL, problems, vulnerabilities, and Davis CoPilot over stdio"
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short = 'd')]
    debug: bool,

    /// Path to a .env file with the DT_* configuration variables
    #[arg(long)]
    env_file: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // stdout belongs to the MCP transport, all diagnostics go to stderr
    init(LogConfig::mcp(cli.debug));

    if let Err(e) = run(cli).await {
        error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match &cli.env_file {
        Some(path) => {
            dotenvy::from_path(path).with_context(|| format!("Failed to load env file {path}"))?;
        }
        None => {
            // a missing .env is fine, the process environment may be enough
            let _ = dotenvy::dotenv();
        }
    }

    let env = DynatraceEnv::from_env().context("Invalid configuration")?;
    info!(
        environment = %env.dt_environment,
        oauth = env.uses_oauth(),
        budget_gb = env.grail_budget_gb,
        "Starting Dynatrace MCP server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let state = Arc::new(ApiState::new(&env).context("Failed to initialize platform clients")?);
    let server = DynatraceMcpServer::new(state);

    info!("MCP server created, starting stdio transport");
    let service = server.serve(stdio()).await?;
    info!("Server ready. Awaiting MCP client requests via stdio.");

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm =
            signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;
        let mut sigint =
            signal(SignalKind::interrupt()).context("Failed to install SIGINT handler")?;

        tokio::select! {
            result = service.waiting() => {
                result?;
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down MCP server");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT (Ctrl+C), shutting down MCP server");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::select! {
            result = service.waiting() => {
                result?;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down MCP server");
            }
        }
    }

    Ok(())
}
