//! # Mem0 MCP Server
//!
//! Exposes the [Mem0](https://mem0.ai) memory platform as Model Context
//! Protocol (MCP) tools, so any MCP-capable agent can store, search and
//! curate long-term memories.
//!
//! ## Overview
//!
//! The server can be used in two ways:
//!
//! 1. **As a standalone server** - run the `mem0-mcp-server` binary over stdio
//! 2. **As a library** - embed [`MemoryTools`] or [`Mem0McpServer`] in your own service
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use mem0_mcp::{EnvSettings, MemoryTools, StaticConfig};
//! use mem0_mcp::types::SearchMemoriesArgs;
//!
//! #[tokio::main]
//! async fn main() -> mem0_mcp::Result<()> {
//!     let tools = MemoryTools::new(StaticConfig::default(), EnvSettings::from_env())?;
//!
//!     let args = SearchMemoriesArgs {
//!         query: "coffee preferences".to_string(),
//!         ..Default::default()
//!     };
//!     println!("{}", tools.search_memories(args, None).await?);
//!     Ok(())
//! }
//! ```
//!
//! ## Tools
//!
//! | Tool | Mem0 call |
//! |------|-----------|
//! | `add_memory` | add |
//! | `search_memories` | search |
//! | `get_memories` | get_all |
//! | `delete_all_memories` | delete_all |
//! | `list_entities` | users |
//! | `get_memory` | get |
//! | `update_memory` | update |
//! | `delete_memory` | delete |
//! | `delete_entities` | delete_users |
//!
//! Every tool returns a JSON string. Mem0 failures come back as
//! `{"error", "status", "payload"}` instead of failing the call.
//!
//! ## Configuration
//!
//! Settings are resolved per call, highest precedence first: session `_meta`,
//! static TOML config, environment (`MEM0_API_KEY`, `MEM0_DEFAULT_USER_ID`,
//! `MEM0_ENABLE_GRAPH_DEFAULT`), then defaults.

#![warn(rustdoc::missing_crate_level_docs)]

/// Mem0 platform API client, trait and client cache.
pub mod mem0;
/// Model Context Protocol (MCP) server integration.
pub mod mcp;
/// Filter normalization for memory queries.
pub mod memory;
/// Tool handlers and JSON envelopes.
pub mod tools;
/// Core types (tool arguments, payloads, errors).
pub mod types;
/// Settings resolution and config loading.
pub mod utils;

// Re-export commonly used types
pub use mcp::{Mem0McpServer, start_stdio_server};
pub use mem0::{ClientCache, Mem0Client, Mem0Error, MemoryStore};
pub use tools::MemoryTools;
pub use types::{AppError, Result};
pub use utils::config::{EnvSettings, SessionConfig, Settings, StaticConfig};
