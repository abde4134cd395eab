//! Configuration for the REPL
//!
//! Everything comes from the environment (a `.env` file is loaded first by
//! the binary). The MCP server to launch is read from an `mcpServers` JSON
//! file in the format most MCP hosts use:
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "mem0-local": { "command": "mem0-mcp-server", "args": [], "env": {} }
//!   }
//! }
//! ```

use crate::{ReplError, Result, DEFAULT_MODEL, DEFAULT_SERVER_TIMEOUT};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_API_KEY: &str = "MEM0_API_KEY";
pub const ENV_CONFIG_PATH: &str = "MEM0_MCP_CONFIG_PATH";
pub const ENV_CONFIG_SERVER: &str = "MEM0_MCP_CONFIG_SERVER";
pub const ENV_SERVER_TIMEOUT: &str = "MEM0_MCP_SERVER_TIMEOUT";
pub const ENV_AGENT_MODEL: &str = "MEM0_MCP_AGENT_MODEL";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";

pub const DEFAULT_CONFIG_PATH: &str = "demos/config.json";
pub const DEFAULT_SERVER_KEY: &str = "mem0-local";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Name of the server binary spawned when no config file exists
pub const SERVER_BINARY: &str = "mem0-mcp-server";

/// Contents of an MCP config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct McpConfig {
    /// Server entries in file order
    #[serde(rename = "mcpServers", default)]
    pub mcp_servers: Map<String, Value>,
}

/// A stdio MCP server launch command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEntry {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Extra variables on top of the inherited environment
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl ServerEntry {
    /// The bundled server: next to this executable if present, else on `PATH`.
    pub fn bundled() -> Self {
        let sibling = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(SERVER_BINARY)))
            .filter(|path| path.is_file());

        Self {
            command: sibling
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| SERVER_BINARY.to_string()),
            args: Vec::new(),
            env: HashMap::new(),
        }
    }

    /// `env` with `${VAR}` placeholders filled from `lookup`.
    pub fn expanded_env(&self, lookup: impl Fn(&str) -> Option<String>) -> HashMap<String, String> {
        self.env
            .iter()
            .map(|(k, v)| (k.clone(), expand_placeholders(v, &lookup)))
            .collect()
    }
}

/// Replace every `${NAME}` in `input`; unknown names are left as written.
pub fn expand_placeholders(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                match lookup(name) {
                    Some(value) => out.push_str(&value),
                    None => out.push_str(&rest[start..start + 2 + end + 1]),
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Read an MCP config file. A missing file is `Ok(None)`.
pub fn load_mcp_config(path: &Path) -> Result<Option<McpConfig>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ReplError::Io(e)),
    };

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| ReplError::Config(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Pick the entry named `key`. An empty key selects the first entry.
pub fn select_server(config: &McpConfig, key: &str, path: &Path) -> Result<(String, ServerEntry)> {
    if config.mcp_servers.is_empty() {
        return Err(ReplError::Config(format!(
            "No 'mcpServers' definitions found in {}",
            path.display()
        )));
    }

    let (name, raw) = if key.is_empty() {
        config
            .mcp_servers
            .iter()
            .next()
            .ok_or_else(|| ReplError::Config(format!("{} has no servers", path.display())))?
    } else {
        config.mcp_servers.iter().find(|(name, _)| *name == key).ok_or_else(|| {
            let available: Vec<&str> = config.mcp_servers.keys().map(String::as_str).collect();
            ReplError::Config(format!(
                "Server '{}' not found in {}. Available: {:?}",
                key,
                path.display(),
                available
            ))
        })?
    };

    let entry: ServerEntry = serde_json::from_value(raw.clone()).map_err(|e| {
        ReplError::Config(format!("Invalid server '{}' in {}: {}", name, path.display(), e))
    })?;
    Ok((name.clone(), entry))
}

/// REPL settings resolved from the environment
#[derive(Debug, Clone)]
pub struct ReplConfig {
    pub config_path: PathBuf,
    pub server_key: String,
    pub timeout: Duration,
    pub model: String,
    pub openai_base_url: String,
    pub openai_api_key: Option<String>,
}

impl ReplConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary lookup. Fails when `MEM0_API_KEY` is unset,
    /// since the spawned server could not do anything without it.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let set = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if set(ENV_API_KEY).is_none() {
            return Err(ReplError::Config(format!(
                "{ENV_API_KEY} must be set before running the agent."
            )));
        }

        let timeout_secs = match set(ENV_SERVER_TIMEOUT) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                ReplError::Config(format!("{ENV_SERVER_TIMEOUT} must be a whole number of seconds, got '{raw}'"))
            })?,
            None => DEFAULT_SERVER_TIMEOUT,
        };

        Ok(Self {
            config_path: set(ENV_CONFIG_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH)),
            // Set-but-empty is meaningful here: it selects the first server
            server_key: lookup(ENV_CONFIG_SERVER).unwrap_or_else(|| DEFAULT_SERVER_KEY.to_string()),
            timeout: Duration::from_secs(timeout_secs),
            model: set(ENV_AGENT_MODEL).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            openai_base_url: set(ENV_OPENAI_BASE_URL)
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            openai_api_key: set(ENV_OPENAI_API_KEY),
        })
    }

    /// The server to launch: the configured entry, or the bundled binary when
    /// the config file does not exist.
    pub fn server(&self) -> Result<(String, ServerEntry)> {
        match load_mcp_config(&self.config_path)? {
            Some(config) => select_server(&config, &self.server_key, &self.config_path),
            None => {
                tracing::debug!(
                    "No MCP config at {}, using bundled server",
                    self.config_path.display()
                );
                Ok((SERVER_BINARY.to_string(), ServerEntry::bundled()))
            }
        }
    }
}
