//! Settings resolution for the Mem0 MCP server
//!
//! Settings can come from three places, consulted highest first:
//! - the per-session config carried on an MCP request (`_meta`)
//! - a static TOML config file (`mem0-mcp.toml` or `--config`)
//! - environment variables (`MEM0_API_KEY`, `MEM0_DEFAULT_USER_ID`,
//!   `MEM0_ENABLE_GRAPH_DEFAULT`)
//!
//! Each place implements [`SettingsSource`]; [`Settings::resolve`] walks them
//! in order and falls back to the hardcoded defaults.

use crate::types::{AppError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default user id when no source provides one
pub const DEFAULT_USER_ID: &str = "mem0-mcp";

/// Default Mem0 REST endpoint
pub const DEFAULT_API_HOST: &str = "https://api.mem0.ai";

/// Default request timeout for the Mem0 transport (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

pub const ENV_API_KEY: &str = "MEM0_API_KEY";
pub const ENV_DEFAULT_USER_ID: &str = "MEM0_DEFAULT_USER_ID";
pub const ENV_ENABLE_GRAPH_DEFAULT: &str = "MEM0_ENABLE_GRAPH_DEFAULT";
pub const ENV_API_HOST: &str = "MEM0_API_HOST";
pub const ENV_CONFIG_PATH: &str = "MEM0_MCP_CONFIG";

/// A place settings can be read from. Every field is optional; `None`
/// means "not set here, ask the next source".
pub trait SettingsSource {
    fn api_key(&self) -> Option<String> {
        None
    }

    fn default_user_id(&self) -> Option<String> {
        None
    }

    fn enable_graph_default(&self) -> Option<bool> {
        None
    }
}

/// Settings resolved for a single tool call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_key: String,
    pub default_user_id: String,
    pub graph_default: bool,
}

impl Settings {
    /// Resolve settings from `sources`, highest precedence first.
    ///
    /// String fields skip empty values. The graph flag is taken from the
    /// first source that sets it at all.
    pub fn resolve(sources: &[&dyn SettingsSource]) -> Result<Self> {
        let api_key = sources
            .iter()
            .find_map(|s| s.api_key().filter(|v| !v.is_empty()))
            .ok_or_else(|| {
                AppError::Config(format!(
                    "{ENV_API_KEY} is required (via session config, config file or environment) to run the Mem0 MCP server"
                ))
            })?;

        let default_user_id = sources
            .iter()
            .find_map(|s| s.default_user_id().filter(|v| !v.is_empty()))
            .unwrap_or_else(|| DEFAULT_USER_ID.to_string());

        let graph_default = sources
            .iter()
            .find_map(|s| s.enable_graph_default())
            .unwrap_or(false);

        Ok(Self {
            api_key,
            default_user_id,
            graph_default,
        })
    }
}

/// Per-session overrides sent by the MCP client in the request `_meta`
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub mem0_api_key: Option<String>,
    pub default_user_id: Option<String>,
    pub enable_graph_default: Option<bool>,
}

impl SessionConfig {
    /// Read session overrides from request metadata. Fields of the wrong
    /// type are ignored rather than failing the call.
    pub fn from_meta(meta: &Map<String, Value>) -> Option<Self> {
        let text = |key: &str| meta.get(key).and_then(Value::as_str).map(str::to_string);
        let session = Self {
            mem0_api_key: text("mem0_api_key"),
            default_user_id: text("default_user_id"),
            enable_graph_default: meta.get("enable_graph_default").and_then(Value::as_bool),
        };

        (session != Self::default()).then_some(session)
    }
}

impl SettingsSource for SessionConfig {
    fn api_key(&self) -> Option<String> {
        self.mem0_api_key.clone()
    }

    fn default_user_id(&self) -> Option<String> {
        self.default_user_id.clone()
    }

    fn enable_graph_default(&self) -> Option<bool> {
        self.enable_graph_default
    }
}

/// Static server configuration loaded from TOML
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticConfig {
    /// Mem0 API key
    pub mem0_api_key: Option<String>,

    /// User id injected when a call names none
    pub default_user_id: Option<String>,

    /// Whether graph memory is on unless a call says otherwise
    pub enable_graph_default: Option<bool>,

    /// Mem0 REST endpoint override
    pub api_host: Option<String>,

    /// Request timeout for Mem0 calls (seconds)
    pub timeout_secs: Option<u64>,
}

impl StaticConfig {
    /// Load configuration from file.
    ///
    /// An explicit path must exist. Without one, `MEM0_MCP_CONFIG` and then
    /// `./mem0-mcp.toml` are tried; finding neither yields the empty config.
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        let config_path = std::env::var(ENV_CONFIG_PATH)
            .ok()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .or_else(|| {
                let local = PathBuf::from("mem0-mcp.toml");
                local.exists().then_some(local)
            });

        match config_path {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }
}

impl SettingsSource for StaticConfig {
    fn api_key(&self) -> Option<String> {
        self.mem0_api_key.clone()
    }

    fn default_user_id(&self) -> Option<String> {
        self.default_user_id.clone()
    }

    fn enable_graph_default(&self) -> Option<bool> {
        self.enable_graph_default
    }
}

/// Snapshot of the `MEM0_*` environment variables
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EnvSettings {
    pub api_key: Option<String>,
    pub default_user_id: Option<String>,
    pub enable_graph_default: Option<bool>,
    pub api_host: Option<String>,
}

impl EnvSettings {
    /// Capture the process environment. Call after `.env` has been loaded.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary lookup, so tests need not touch the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api_key: lookup(ENV_API_KEY),
            default_user_id: lookup(ENV_DEFAULT_USER_ID),
            enable_graph_default: lookup(ENV_ENABLE_GRAPH_DEFAULT).map(|v| parse_flag(&v)),
            api_host: lookup(ENV_API_HOST).filter(|v| !v.is_empty()),
        }
    }
}

impl SettingsSource for EnvSettings {
    fn api_key(&self) -> Option<String> {
        self.api_key.clone()
    }

    fn default_user_id(&self) -> Option<String> {
        self.default_user_id.clone()
    }

    fn enable_graph_default(&self) -> Option<bool> {
        self.enable_graph_default
    }
}

/// `1`, `true` and `yes` (any case) are true; anything else is false.
pub fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes")
}

/// Transport options for the Mem0 REST client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    pub api_host: String,
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_host: DEFAULT_API_HOST.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientOptions {
    /// Static config beats the environment, which beats the defaults.
    pub fn from_sources(config: &StaticConfig, env: &EnvSettings) -> Self {
        let api_host = config
            .api_host
            .clone()
            .filter(|h| !h.is_empty())
            .or_else(|| env.api_host.clone())
            .unwrap_or_else(|| DEFAULT_API_HOST.to_string());

        Self {
            api_host: api_host.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        }
    }
}
