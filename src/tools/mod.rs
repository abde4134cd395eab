//! Mem0 tools exposed over MCP.
//!
//! - [`memory`] - tool handlers
//! - [`envelope`] - JSON success/error envelopes

pub mod envelope;
pub mod memory;

pub use memory::MemoryTools;
