use clap::Parser;
use mem0_mcp::{EnvSettings, MemoryTools, StaticConfig, start_stdio_server};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Mem0 MCP Server
///
/// Exposes the Mem0 memory API as MCP tools over stdio. Configure it with
/// MEM0_API_KEY (required), MEM0_DEFAULT_USER_ID and MEM0_ENABLE_GRAPH_DEFAULT.
#[derive(Parser, Debug)]
#[command(name = "mem0-mcp-server", version, about = "Mem0 MCP Server (stdio)")]
struct Cli {
    /// Optional TOML config file (defaults to $MEM0_MCP_CONFIG or ./mem0-mcp.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

/// Logs go to stderr; stdout carries the protocol.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let static_config = StaticConfig::load(cli.config.as_ref())?;
    let tools = MemoryTools::new(static_config, EnvSettings::from_env())?;

    tracing::info!(
        "Starting Mem0 MCP server (default user={})",
        tools.default_user_id()?
    );

    start_stdio_server(tools).await?;
    Ok(())
}
