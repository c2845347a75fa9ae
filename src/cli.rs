//! Command-line interface: `serve` and `version`.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use crate::config::load_config;
use crate::mcp::{http, server, sse, PrometheusServer};
use crate::observability::init_logging;
use crate::prometheus::AuthMode;

#[derive(Parser, Debug)]
#[command(name = "mcp-prometheus")]
#[command(about = "MCP server for the Prometheus HTTP API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the MCP server
    Serve(ServeArgs),
    /// Print the version
    Version,
}

/// Transport the server speaks to its MCP client.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum TransportKind {
    #[default]
    Stdio,
    Sse,
    StreamableHttp,
}

#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    #[arg(long, value_enum, default_value_t = TransportKind::Stdio)]
    pub transport: TransportKind,

    /// Listen address for the HTTP transports (`:8080` binds all interfaces)
    #[arg(long, default_value = ":8080")]
    pub http_addr: String,

    #[arg(long, default_value = "/sse")]
    pub sse_endpoint: String,

    #[arg(long, default_value = "/message")]
    pub message_endpoint: String,

    #[arg(long, default_value = "/mcp")]
    pub http_endpoint: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Path to a YAML config file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn version_string() -> String {
    format!("mcp-prometheus {}", env!("CARGO_PKG_VERSION"))
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => run_serve(args).await,
        Command::Version => {
            println!("{}", version_string());
            Ok(())
        }
    }
}

pub async fn run_serve(args: ServeArgs) -> anyhow::Result<()> {
    init_logging(args.debug);

    let config = load_config(args.config.as_deref()).context("failed to load configuration")?;
    let connection = &config.prometheus;
    match connection.url.as_deref() {
        Some(url) => info!(
            auth = AuthMode::for_config(connection).as_str(),
            org_id = connection.org_id.is_some(),
            "Prometheus URL configured: {}",
            crate::observability::redact_secrets(url)
        ),
        None => info!("No Prometheus URL configured; tools must pass prometheus_url"),
    }
    info!(preset = %config.preset, transport = ?args.transport, "Starting mcp-prometheus");

    let server = PrometheusServer::new(config).context("failed to build HTTP client")?;
    match args.transport {
        TransportKind::Stdio => server::run_stdio(server).await,
        TransportKind::Sse => {
            sse::run_sse_server(
                server,
                &args.http_addr,
                &args.sse_endpoint,
                &args.message_endpoint,
            )
            .await
        }
        TransportKind::StreamableHttp => {
            http::run_http_server(server, &args.http_addr, &args.http_endpoint).await
        }
    }
}
