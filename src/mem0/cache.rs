use crate::mem0::client::Mem0Client;
use crate::mem0::store::MemoryStore;
use crate::types::Result;
use crate::utils::config::ClientOptions;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Builds a store handle for an api key
pub type StoreFactory = Arc<dyn Fn(&str) -> Result<Arc<dyn MemoryStore>> + Send + Sync>;

/// Upper bound on cached clients; session metadata can name any number of keys.
pub const DEFAULT_MAX_CLIENTS: usize = 64;

/// Per-api-key cache of Mem0 client handles, owned by one server instance.
///
/// Entries are never expired by time. Once `max_clients` keys are
/// cached, inserting a new one evicts an arbitrary existing entry; an
/// evicted key simply gets a fresh client on its next call.
#[derive(Clone)]
pub struct ClientCache {
    factory: StoreFactory,
    clients: Arc<Mutex<HashMap<String, Arc<dyn MemoryStore>>>>,
    max_clients: usize,
}

impl std::fmt::Debug for ClientCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCache")
            .field("client_count", &self.len())
            .finish()
    }
}

impl ClientCache {
    pub fn new(factory: StoreFactory) -> Self {
        Self {
            factory,
            clients: Arc::new(Mutex::new(HashMap::new())),
            max_clients: DEFAULT_MAX_CLIENTS,
        }
    }

    pub fn with_max_clients(mut self, max_clients: usize) -> Self {
        self.max_clients = max_clients.max(1);
        self
    }

    /// Cache backed by real HTTP clients.
    pub fn http(options: ClientOptions) -> Self {
        Self::new(Arc::new(move |api_key: &str| -> Result<Arc<dyn MemoryStore>> {
            let client: Arc<dyn MemoryStore> = Arc::new(Mem0Client::new(api_key, &options)?);
            Ok(client)
        }))
    }

    /// Return the cached handle for `api_key`, creating it on first use.
    pub fn get_or_create(&self, api_key: &str) -> Result<Arc<dyn MemoryStore>> {
        let mut clients = self.clients.lock();
        if let Some(client) = clients.get(api_key) {
            return Ok(Arc::clone(client));
        }

        tracing::debug!("Creating Mem0 client for a new api key");
        let client = (self.factory)(api_key)?;
        if clients.len() >= self.max_clients {
            if let Some(evicted) = clients.keys().next().cloned() {
                tracing::debug!("Client cache full, evicting one entry");
                clients.remove(&evicted);
            }
        }
        clients.insert(api_key.to_string(), Arc::clone(&client));
        Ok(client)
    }

    pub fn len(&self) -> usize {
        self.clients.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
