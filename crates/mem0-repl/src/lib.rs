//! # Mem0 REPL
//!
//! Interactive demo client for the Mem0 MCP server. It launches the server
//! over stdio, lists and calls its tools directly, and can hand free-form
//! prompts to an LLM agent that uses those tools on the user's behalf.
//!
//! ## Quick Start
//!
//! ```bash
//! export MEM0_API_KEY=m0-...
//! export OPENAI_API_KEY=sk-...   # optional, enables the agent
//! mem0-repl
//! ```
//!
//! Inside the prompt:
//!
//! ```text
//! You> /tools
//! You> /call search_memories {"query": "coffee"}
//! You> I just moved to Lisbon, remember that
//! ```

pub mod agent;
pub mod config;
pub mod repl;
pub mod session;

pub use agent::MemoryAgent;
pub use config::ReplConfig;
pub use session::{McpSession, ToolExecutor};

/// Error types for the REPL
#[derive(Debug, thiserror::Error)]
pub enum ReplError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("MCP error: {0}")]
    Mcp(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Timeout: {0}")]
    Timeout(String),
}

/// Result type alias for REPL operations
pub type Result<T> = std::result::Result<T, ReplError>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default chat model for the agent
pub const DEFAULT_MODEL: &str = "gpt-5";

/// Maximum LLM round trips per prompt
pub const MAX_TOOL_ITERATIONS: usize = 10;

/// Default per-call MCP timeout (in seconds)
pub const DEFAULT_SERVER_TIMEOUT: u64 = 30;
