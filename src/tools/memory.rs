//! Mem0 tool handlers
//!
//! One method per tool. Each resolves settings for the call, shapes the
//! arguments into a Mem0 payload, forwards through the cached client and
//! returns the JSON string produced by [`store_envelope`].

use crate::mem0::{ClientCache, MemoryStore, StoreResult};
use crate::memory::with_default_filters;
use crate::tools::envelope::{
    CLIENT_UNAVAILABLE, MESSAGES_MISSING, SCOPE_MISSING, store_envelope, validation_error,
};
use crate::types::{
    AddMemoryArgs, AddPayload, AppError, GetMemoriesArgs, ListPayload, MemoryIdArgs, Result,
    Scope, ScopeArgs, SearchMemoriesArgs, SearchPayload, ToolMessage, UpdateMemoryArgs, non_empty,
};
use crate::utils::config::{
    ClientOptions, ENV_API_KEY, EnvSettings, SessionConfig, Settings, SettingsSource, StaticConfig,
};
use std::future::Future;
use std::sync::Arc;

/// The Mem0 tool set, independent of the MCP transport.
#[derive(Debug, Clone)]
pub struct MemoryTools {
    static_config: StaticConfig,
    env: EnvSettings,
    cache: ClientCache,
}

impl MemoryTools {
    /// Build tools backed by HTTP clients.
    ///
    /// Fails fast when neither the environment nor the static config has an
    /// api key, so a misconfigured server never starts serving.
    pub fn new(static_config: StaticConfig, env: EnvSettings) -> Result<Self> {
        let options = ClientOptions::from_sources(&static_config, &env);
        Self::with_cache(static_config, env, ClientCache::http(options))
    }

    /// Build tools on top of an existing client cache.
    pub fn with_cache(static_config: StaticConfig, env: EnvSettings, cache: ClientCache) -> Result<Self> {
        let has_key = [env.api_key(), static_config.api_key()]
            .into_iter()
            .flatten()
            .any(|key| !key.is_empty());
        if !has_key {
            return Err(AppError::Config(format!(
                "{ENV_API_KEY} is required via environment variables or the config file"
            )));
        }

        Ok(Self {
            static_config,
            env,
            cache,
        })
    }

    /// Resolve settings with session > static config > environment.
    pub fn settings(&self, session: Option<&SessionConfig>) -> Result<Settings> {
        let mut sources: Vec<&dyn SettingsSource> = Vec::with_capacity(3);
        if let Some(session) = session {
            sources.push(session);
        }
        sources.push(&self.static_config);
        sources.push(&self.env);
        Settings::resolve(&sources)
    }

    /// Default user id used when no session overrides it; logged at startup.
    pub fn default_user_id(&self) -> Result<String> {
        Ok(self.settings(None)?.default_user_id)
    }

    pub fn cache(&self) -> &ClientCache {
        &self.cache
    }

    /// Run `call` against the client for the resolved api key and wrap the
    /// outcome. A key the client cannot be built from (e.g. one that is not
    /// a valid header value) is reported as an envelope, not a call failure.
    async fn forward<F, Fut>(&self, settings: &Settings, call: F) -> Result<String>
    where
        F: FnOnce(Arc<dyn MemoryStore>) -> Fut,
        Fut: Future<Output = StoreResult>,
    {
        match self.cache.get_or_create(&settings.api_key) {
            Ok(store) => Ok(store_envelope(call(store).await)),
            Err(e) => {
                tracing::error!("Cannot build Mem0 client: {}", e);
                Ok(validation_error(CLIENT_UNAVAILABLE, &e.to_string()))
            }
        }
    }

    /// Store a preference, fact or conversation snippet.
    pub async fn add_memory(
        &self,
        args: AddMemoryArgs,
        session: Option<&SessionConfig>,
    ) -> Result<String> {
        let settings = self.settings(session)?;

        let messages = match args.messages.filter(|m| !m.is_empty()) {
            Some(messages) => messages,
            None => match non_empty(args.text) {
                Some(text) => vec![ToolMessage::user(text)],
                None => {
                    return Ok(validation_error(
                        MESSAGES_MISSING,
                        "Provide either `text` or `messages` so Mem0 knows what to store.",
                    ));
                }
            },
        };

        let mut scope = Scope::from_args(ScopeArgs {
            user_id: args.user_id,
            agent_id: args.agent_id,
            app_id: args.app_id,
            run_id: args.run_id,
        });
        scope.user_id.get_or_insert_with(|| settings.default_user_id.clone());

        let payload = AddPayload {
            messages,
            scope,
            metadata: args.metadata,
            enable_graph: args.enable_graph.unwrap_or(settings.graph_default),
        };

        tracing::debug!(messages = payload.messages.len(), "add_memory");
        self.forward(&settings, |store| async move { store.add(&payload).await })
            .await
    }

    /// Semantic search, always scoped to a user.
    pub async fn search_memories(
        &self,
        args: SearchMemoriesArgs,
        session: Option<&SessionConfig>,
    ) -> Result<String> {
        let settings = self.settings(session)?;
        let payload = SearchPayload {
            query: args.query,
            filters: with_default_filters(&settings.default_user_id, args.filters)?,
            limit: args.limit,
            enable_graph: args.enable_graph.unwrap_or(settings.graph_default),
        };

        tracing::debug!(limit = ?payload.limit, "search_memories");
        self.forward(&settings, |store| async move { store.search(&payload).await })
            .await
    }

    /// Page through memories by filter.
    pub async fn get_memories(
        &self,
        args: GetMemoriesArgs,
        session: Option<&SessionConfig>,
    ) -> Result<String> {
        let settings = self.settings(session)?;
        let payload = ListPayload {
            filters: with_default_filters(&settings.default_user_id, args.filters)?,
            page: args.page,
            page_size: args.page_size,
            enable_graph: args.enable_graph.unwrap_or(settings.graph_default),
        };

        tracing::debug!(page = ?payload.page, page_size = ?payload.page_size, "get_memories");
        self.forward(&settings, |store| async move { store.get_all(&payload).await })
            .await
    }

    /// Delete every memory in a scope; the user defaults to the configured one.
    pub async fn delete_all_memories(
        &self,
        args: ScopeArgs,
        session: Option<&SessionConfig>,
    ) -> Result<String> {
        let settings = self.settings(session)?;
        let mut scope = Scope::from_args(args);
        scope.user_id.get_or_insert_with(|| settings.default_user_id.clone());

        tracing::debug!("delete_all_memories");
        self.forward(&settings, |store| async move { store.delete_all(&scope).await })
            .await
    }

    pub async fn list_entities(&self, session: Option<&SessionConfig>) -> Result<String> {
        let settings = self.settings(session)?;
        self.forward(&settings, |store| async move { store.users().await })
            .await
    }

    pub async fn get_memory(
        &self,
        args: MemoryIdArgs,
        session: Option<&SessionConfig>,
    ) -> Result<String> {
        let settings = self.settings(session)?;
        self.forward(&settings, |store| async move { store.get(&args.memory_id).await })
            .await
    }

    pub async fn update_memory(
        &self,
        args: UpdateMemoryArgs,
        session: Option<&SessionConfig>,
    ) -> Result<String> {
        let settings = self.settings(session)?;
        self.forward(&settings, |store| async move {
            store.update(&args.memory_id, &args.text).await
        })
        .await
    }

    pub async fn delete_memory(
        &self,
        args: MemoryIdArgs,
        session: Option<&SessionConfig>,
    ) -> Result<String> {
        let settings = self.settings(session)?;
        self.forward(&settings, |store| async move { store.delete(&args.memory_id).await })
            .await
    }

    /// Remove an entity and its memories. Requires an explicit scope;
    /// there is no default user here. Only the first of user, agent, app
    /// and run is deleted.
    pub async fn delete_entities(
        &self,
        args: ScopeArgs,
        session: Option<&SessionConfig>,
    ) -> Result<String> {
        let settings = self.settings(session)?;
        let scope = Scope::from_args(args);
        if scope.is_empty() {
            return Ok(validation_error(
                SCOPE_MISSING,
                "Provide user_id, agent_id, app_id, or run_id before calling delete_entities.",
            ));
        }

        let target = scope.primary_only();
        if target != scope {
            tracing::warn!(
                ignored = scope.entities().len() - 1,
                "delete_entities removes a single entity; extra identifiers ignored"
            );
        }

        self.forward(&settings, |store| async move { store.delete_users(&target).await })
            .await
    }
}
