//! Model Context Protocol (MCP) server over stdio.

pub mod server;

pub use server::{Mem0McpServer, start_stdio_server};
