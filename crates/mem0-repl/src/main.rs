//! Mem0 REPL entry point
//!
//! Launches the Mem0 MCP server, then reads prompts and commands until
//! `exit`. All settings come from the environment (see `--help`).

use clap::Parser;
use mem0_repl::repl::Repl;
use mem0_repl::{McpSession, MemoryAgent, ReplConfig, Result};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mem0-repl")]
#[command(author, version, about = "Interactive demo client for the Mem0 MCP server")]
#[command(long_about = r#"
Interactive demo client for the Mem0 MCP server.

Environment:
  MEM0_API_KEY              required, passed on to the server
  MEM0_MCP_CONFIG_PATH      mcpServers JSON file (default demos/config.json)
  MEM0_MCP_CONFIG_SERVER    entry to launch (default mem0-local, empty = first)
  MEM0_MCP_SERVER_TIMEOUT   per-call timeout in seconds (default 30)
  OPENAI_API_KEY            enables the chat agent
  OPENAI_BASE_URL           OpenAI-compatible endpoint (default https://api.openai.com/v1)
  MEM0_MCP_AGENT_MODEL      chat model (default gpt-5)
"#)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = ReplConfig::from_env()?;
    let (name, entry) = config.server()?;
    let session = McpSession::connect(&name, &entry, config.timeout).await?;
    tracing::info!(
        "Connected to MCP server '{}' ({} tools)",
        session.name(),
        session.tools().len()
    );
    let agent = MemoryAgent::from_config(&config);

    let mut repl = Repl::new(session, agent);
    let result = repl.run().await;

    repl.into_executor().shutdown().await?;
    result
}
