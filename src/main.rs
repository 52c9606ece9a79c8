use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use solana_mcp::config::Config;
use solana_mcp::rpc::{HttpRpc, MockRpc, SolanaRpc};
use solana_mcp::server::McpServer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Transport {
    /// Newline-delimited JSON-RPC on stdin/stdout
    Stdio,
    /// HTTP server with an SSE event stream
    Http,
}

#[derive(Parser, Debug)]
#[command(name = "solana-mcp", version, about = "Solana MCP server")]
struct Args {
    /// Transport to serve
    #[arg(long, value_enum, default_value = "stdio")]
    transport: Transport,

    /// Port for the HTTP transport
    #[arg(long, default_value_t = 3000)]
    port: u16,

    /// Log level filter (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Answer from canned data instead of a live RPC endpoint
    #[arg(long)]
    mock: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Stdout carries the protocol on the stdio transport; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(args.log_level.clone())),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = Config::from_env();

    let rpc: Arc<dyn SolanaRpc> = if args.mock {
        info!("mock mode: answering from canned data");
        Arc::new(MockRpc::with_defaults())
    } else {
        info!("RPC endpoint: {}", config.rpc_url);
        Arc::new(HttpRpc::new(reqwest::Client::new(), &config.rpc_url))
    };

    let server = McpServer::new(config, rpc)?;

    match args.transport {
        Transport::Stdio => server.run_stdio().await,
        Transport::Http => server.run_http(args.port).await,
    }
}
