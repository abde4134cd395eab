use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============= Conversation Types =============

/// A single conversation turn handed to Mem0 for memory extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolMessage {
    /// Speaker of the turn, usually `user` or `assistant`
    pub role: String,
    /// Text of the turn
    pub content: String,
}

impl ToolMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

// ============= Tool Argument Types =============

/// Arguments for `add_memory`
#[derive(Debug, Default, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AddMemoryArgs {
    /// Plain sentence summarizing what to store. Required if `messages` is missing.
    pub text: Option<String>,
    /// Structured conversation history with `role`/`content`. Use when you have multiple turns.
    pub messages: Option<Vec<ToolMessage>>,
    /// Override for the Mem0 user ID (defaults to the configured default user).
    pub user_id: Option<String>,
    /// Optional agent identifier.
    pub agent_id: Option<String>,
    /// Optional app identifier.
    pub app_id: Option<String>,
    /// Optional run identifier.
    pub run_id: Option<String>,
    /// Attach arbitrary metadata JSON to the memory.
    pub metadata: Option<Map<String, Value>>,
    /// Set true only if the caller explicitly wants Mem0 graph memory.
    pub enable_graph: Option<bool>,
}

/// Arguments for `search_memories`
#[derive(Debug, Default, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchMemoriesArgs {
    /// Natural language description of what to find.
    pub query: String,
    /// Additional filter clauses (AND/OR/NOT trees). The default user_id is injected automatically.
    pub filters: Option<Map<String, Value>>,
    /// Maximum number of results to return.
    pub limit: Option<u32>,
    /// Set true only when the user explicitly wants graph-derived memories.
    pub enable_graph: Option<bool>,
}

/// Arguments for `get_memories`
#[derive(Debug, Default, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetMemoriesArgs {
    /// Structured filters; the default user_id is injected automatically.
    pub filters: Option<Map<String, Value>>,
    /// 1-indexed page number when paginating.
    pub page: Option<u32>,
    /// Number of memories per page.
    pub page_size: Option<u32>,
    /// Set true only if the caller explicitly wants graph-derived memories.
    pub enable_graph: Option<bool>,
}

/// Scope arguments shared by `delete_all_memories` and `delete_entities`
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ScopeArgs {
    /// User whose records should be targeted.
    pub user_id: Option<String>,
    /// Agent whose records should be targeted.
    pub agent_id: Option<String>,
    /// App whose records should be targeted.
    pub app_id: Option<String>,
    /// Run whose records should be targeted.
    pub run_id: Option<String>,
}

/// Arguments for tools addressing a single memory
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MemoryIdArgs {
    /// Exact memory_id to operate on.
    pub memory_id: String,
}

/// Arguments for `update_memory`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UpdateMemoryArgs {
    /// Exact memory_id to overwrite.
    pub memory_id: String,
    /// Replacement text for the memory.
    pub text: String,
}

// ============= Remote Payload Types =============

/// Scope sent to Mem0; unset identifiers are omitted from the wire payload.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
}

impl Scope {
    /// Build a scope from tool arguments, treating empty identifiers as unset.
    pub fn from_args(args: ScopeArgs) -> Self {
        Self {
            user_id: non_empty(args.user_id),
            agent_id: non_empty(args.agent_id),
            app_id: non_empty(args.app_id),
            run_id: non_empty(args.run_id),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.user_id.is_none()
            && self.agent_id.is_none()
            && self.app_id.is_none()
            && self.run_id.is_none()
    }

    /// `(entity_type, id)` pairs in Mem0's entity path order.
    pub fn entities(&self) -> Vec<(&'static str, &str)> {
        [
            ("user", self.user_id.as_deref()),
            ("agent", self.agent_id.as_deref()),
            ("app", self.app_id.as_deref()),
            ("run", self.run_id.as_deref()),
        ]
        .into_iter()
        .filter_map(|(kind, id)| id.map(|id| (kind, id)))
        .collect()
    }

    /// The one entity Mem0 removes for this scope: user, then agent, app, run.
    pub fn primary_entity(&self) -> Option<(&'static str, &str)> {
        self.entities().into_iter().next()
    }

    /// Copy of the scope holding only [`Self::primary_entity`].
    pub fn primary_only(&self) -> Self {
        let mut scope = Self::default();
        match self.primary_entity() {
            Some(("user", id)) => scope.user_id = Some(id.to_string()),
            Some(("agent", id)) => scope.agent_id = Some(id.to_string()),
            Some(("app", id)) => scope.app_id = Some(id.to_string()),
            Some((_, id)) => scope.run_id = Some(id.to_string()),
            None => {}
        }
        scope
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddPayload {
    pub messages: Vec<ToolMessage>,
    #[serde(flatten)]
    pub scope: Scope,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    pub enable_graph: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchPayload {
    pub query: String,
    pub filters: Value,
    #[serde(rename = "top_k", skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    pub enable_graph: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListPayload {
    pub filters: Value,
    #[serde(skip)]
    pub page: Option<u32>,
    #[serde(skip)]
    pub page_size: Option<u32>,
    pub enable_graph: bool,
}

/// Treat `Some("")` the same as `None`.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AppError> for rmcp::ErrorData {
    fn from(err: AppError) -> Self {
        match err {
            AppError::InvalidFilter(_) => rmcp::ErrorData::invalid_params(err.to_string(), None),
            other => rmcp::ErrorData::internal_error(other.to_string(), None),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
