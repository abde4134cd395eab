//! Mock implementations for testing.
//!
//! A recording [`MemoryStore`] that can be shared across test files without
//! touching the network.

use async_trait::async_trait;
use mem0_mcp::mem0::{ClientCache, Mem0Error, MemoryStore, StoreResult};
use mem0_mcp::types::{AddPayload, ListPayload, Result, Scope, SearchPayload};
use mem0_mcp::utils::config::{EnvSettings, StaticConfig};
use mem0_mcp::MemoryTools;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::sync::Arc;

/// A call observed by [`MockMemoryStore`]
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Add(AddPayload),
    Search(SearchPayload),
    GetAll(ListPayload),
    Get(String),
    Update(String, String),
    Delete(String),
    DeleteAll(Scope),
    DeleteUsers(Scope),
    Users,
}

/// Mock store that records every call and returns a fixed response.
///
/// # Examples
///
/// ```ignore
/// let store = MockMemoryStore::new(json!({"results": []}));
/// let store = MockMemoryStore::failing(Mem0Error::from_response(429, "{}"));
/// ```
#[derive(Clone)]
pub struct MockMemoryStore {
    response: std::result::Result<Value, Mem0Error>,
    calls: Arc<Mutex<Vec<StoreCall>>>,
}

impl MockMemoryStore {
    /// Create a store that answers every call with `response`.
    pub fn new(response: Value) -> Self {
        Self {
            response: Ok(response),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a store whose every call fails with `error`.
    pub fn failing(error: Mem0Error) -> Self {
        Self {
            response: Err(error),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().clone()
    }

    fn record(&self, call: StoreCall) -> StoreResult {
        self.calls.lock().push(call);
        self.response.clone()
    }
}

impl Default for MockMemoryStore {
    fn default() -> Self {
        Self::new(json!({"ok": true}))
    }
}

#[async_trait]
impl MemoryStore for MockMemoryStore {
    async fn add(&self, payload: &AddPayload) -> StoreResult {
        self.record(StoreCall::Add(payload.clone()))
    }

    async fn search(&self, payload: &SearchPayload) -> StoreResult {
        self.record(StoreCall::Search(payload.clone()))
    }

    async fn get_all(&self, payload: &ListPayload) -> StoreResult {
        self.record(StoreCall::GetAll(payload.clone()))
    }

    async fn get(&self, memory_id: &str) -> StoreResult {
        self.record(StoreCall::Get(memory_id.to_string()))
    }

    async fn update(&self, memory_id: &str, text: &str) -> StoreResult {
        self.record(StoreCall::Update(memory_id.to_string(), text.to_string()))
    }

    async fn delete(&self, memory_id: &str) -> StoreResult {
        self.record(StoreCall::Delete(memory_id.to_string()))
    }

    async fn delete_all(&self, scope: &Scope) -> StoreResult {
        self.record(StoreCall::DeleteAll(scope.clone()))
    }

    async fn delete_users(&self, scope: &Scope) -> StoreResult {
        self.record(StoreCall::DeleteUsers(scope.clone()))
    }

    async fn users(&self) -> StoreResult {
        self.record(StoreCall::Users)
    }
}

/// Environment with just an api key and a default user.
pub fn test_env() -> EnvSettings {
    EnvSettings {
        api_key: Some("env-key".to_string()),
        default_user_id: Some("alice".to_string()),
        ..Default::default()
    }
}

/// Cache whose factory hands out `store` and records the api keys it saw.
pub fn mock_cache(store: MockMemoryStore) -> (ClientCache, Arc<Mutex<Vec<String>>>) {
    let keys = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&keys);
    let cache = ClientCache::new(Arc::new(
        move |api_key: &str| -> Result<Arc<dyn MemoryStore>> {
            seen.lock().push(api_key.to_string());
            let store: Arc<dyn MemoryStore> = Arc::new(store.clone());
            Ok(store)
        },
    ));
    (cache, keys)
}

/// Tools wired to a mock store with the default test environment.
pub fn mock_tools(store: MockMemoryStore) -> MemoryTools {
    let (cache, _) = mock_cache(store);
    MemoryTools::with_cache(StaticConfig::default(), test_env(), cache)
        .expect("test env carries an api key")
}
