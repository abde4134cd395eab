use crate::types::{AddPayload, ListPayload, Scope, SearchPayload};
use async_trait::async_trait;
use serde_json::Value;

/// Structured failure from the Mem0 API.
///
/// `status` and `payload` are `None` when the request never got an HTTP
/// response (DNS, TLS, timeout).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct Mem0Error {
    pub message: String,
    pub status: Option<u16>,
    pub payload: Option<Value>,
}

impl Mem0Error {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            payload: None,
        }
    }

    /// Build from a non-2xx response. The body becomes the payload (parsed
    /// as JSON when possible) and a `detail`/`error`/`message` field, if
    /// present, becomes the message.
    pub fn from_response(status: u16, body: &str) -> Self {
        let payload = if body.trim().is_empty() {
            None
        } else {
            Some(
                serde_json::from_str::<Value>(body)
                    .unwrap_or_else(|_| Value::String(body.to_string())),
            )
        };

        let message = payload
            .as_ref()
            .and_then(|p| {
                ["detail", "error", "message"]
                    .iter()
                    .find_map(|key| p.get(*key).and_then(Value::as_str))
            })
            .map(str::to_string)
            .unwrap_or_else(|| format!("Mem0 API request failed with status {status}"));

        Self {
            message,
            status: Some(status),
            payload,
        }
    }
}

impl From<reqwest::Error> for Mem0Error {
    fn from(err: reqwest::Error) -> Self {
        Self {
            message: format!("Mem0 request failed: {err}"),
            status: err.status().map(|s| s.as_u16()),
            payload: None,
        }
    }
}

pub type StoreResult = std::result::Result<Value, Mem0Error>;

/// The subset of the Mem0 platform API the tools forward to.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Store a conversation; Mem0 extracts the memories.
    async fn add(&self, payload: &AddPayload) -> StoreResult;

    /// Semantic search over stored memories.
    async fn search(&self, payload: &SearchPayload) -> StoreResult;

    /// List memories matching structured filters, optionally paginated.
    async fn get_all(&self, payload: &ListPayload) -> StoreResult;

    async fn get(&self, memory_id: &str) -> StoreResult;

    async fn update(&self, memory_id: &str, text: &str) -> StoreResult;

    async fn delete(&self, memory_id: &str) -> StoreResult;

    /// Delete every memory in `scope`, keeping the entities.
    async fn delete_all(&self, scope: &Scope) -> StoreResult;

    /// Delete one entity together with its memories: the first of user,
    /// agent, app and run set in `scope`.
    async fn delete_users(&self, scope: &Scope) -> StoreResult;

    /// Users, agents, apps and runs that currently hold memories.
    async fn users(&self) -> StoreResult;
}
