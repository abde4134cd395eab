//! HTTP client for the Mem0 platform API
//!
//! Thin `reqwest` wrapper: one request per call, fixed timeout, no retries.
//! Every non-2xx response becomes a [`Mem0Error`] carrying the status code
//! and the response body.

use crate::mem0::store::{Mem0Error, MemoryStore, StoreResult};
use crate::types::{AddPayload, AppError, ListPayload, Result, Scope, SearchPayload};
use crate::utils::config::ClientOptions;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, Url};
use serde_json::{Value, json};

pub struct Mem0Client {
    http_client: reqwest::Client,
    base_url: Url,
}

impl std::fmt::Debug for Mem0Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // api key lives in the default headers; keep it out of Debug output
        f.debug_struct("Mem0Client")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl Mem0Client {
    pub fn new(api_key: &str, options: &ClientOptions) -> Result<Self> {
        let base_url = Url::parse(&options.api_host).map_err(|e| {
            AppError::Config(format!("Invalid Mem0 host {}: {}", options.api_host, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Config(format!(
                "Invalid Mem0 host {}: not a base URL",
                options.api_host
            )));
        }

        let mut auth = HeaderValue::from_str(&format!("Token {api_key}"))
            .map_err(|_| AppError::Config("Mem0 API key contains invalid characters".into()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(options.timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL, keeping Mem0's trailing slash.
    fn endpoint(&self, segments: &[&str]) -> std::result::Result<Url, Mem0Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Mem0Error::new(format!("Cannot build Mem0 URL from {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments)
            .push("");
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> StoreResult {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Mem0Error::from_response(status.as_u16(), &body));
        }

        if body.trim().is_empty() {
            return Ok(json!({ "message": "ok" }));
        }

        serde_json::from_str(&body).map_err(|e| Mem0Error {
            message: format!("Mem0 returned invalid JSON: {e}"),
            status: Some(status.as_u16()),
            payload: Some(Value::String(body)),
        })
    }
}

#[async_trait]
impl MemoryStore for Mem0Client {
    async fn add(&self, payload: &AddPayload) -> StoreResult {
        let url = self.endpoint(&["v1", "memories"])?;
        self.send(self.http_client.post(url).json(payload)).await
    }

    async fn search(&self, payload: &SearchPayload) -> StoreResult {
        let url = self.endpoint(&["v2", "memories", "search"])?;
        self.send(self.http_client.post(url).json(payload)).await
    }

    async fn get_all(&self, payload: &ListPayload) -> StoreResult {
        let url = self.endpoint(&["v2", "memories"])?;
        let mut request = self.http_client.post(url).json(payload);
        if let Some(page) = payload.page {
            request = request.query(&[("page", page)]);
        }
        if let Some(page_size) = payload.page_size {
            request = request.query(&[("page_size", page_size)]);
        }
        self.send(request).await
    }

    async fn get(&self, memory_id: &str) -> StoreResult {
        let url = self.endpoint(&["v1", "memories", memory_id])?;
        self.send(self.http_client.get(url)).await
    }

    async fn update(&self, memory_id: &str, text: &str) -> StoreResult {
        let url = self.endpoint(&["v1", "memories", memory_id])?;
        self.send(self.http_client.put(url).json(&json!({ "text": text })))
            .await
    }

    async fn delete(&self, memory_id: &str) -> StoreResult {
        let url = self.endpoint(&["v1", "memories", memory_id])?;
        self.send(self.http_client.delete(url)).await
    }

    async fn delete_all(&self, scope: &Scope) -> StoreResult {
        let url = self.endpoint(&["v1", "memories"])?;
        self.send(self.http_client.delete(url).query(scope)).await
    }

    async fn delete_users(&self, scope: &Scope) -> StoreResult {
        let Some((kind, id)) = scope.primary_entity() else {
            return Err(Mem0Error::new(
                "Refusing to delete entities without a user_id, agent_id, app_id or run_id",
            ));
        };

        let url = self.endpoint(&["v2", "entities", kind, id])?;
        self.send(self.http_client.delete(url)).await?;
        Ok(json!({ "message": "Entity deleted successfully." }))
    }

    async fn users(&self) -> StoreResult {
        let url = self.endpoint(&["v1", "entities"])?;
        self.send(self.http_client.get(url)).await
    }
}
