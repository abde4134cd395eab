//! MCP client session
//!
//! Launches the configured server as a child process, performs the MCP
//! handshake and keeps the tool list. Every request is bounded by the
//! configured timeout.

use crate::config::ServerEntry;
use crate::{ReplError, Result};
use async_trait::async_trait;
use rmcp::model::{CallToolRequestParam, CallToolResult, Tool};
use rmcp::service::{RoleClient, RunningService, ServiceExt};
use rmcp::transport::TokioChildProcess;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tokio::process::Command;

/// Tool schema in the shape chat models expect
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON schema of the arguments object
    pub parameters: Value,
}

impl From<&Tool> for ToolSpec {
    fn from(tool: &Tool) -> Self {
        Self {
            name: tool.name.to_string(),
            description: tool
                .description
                .as_ref()
                .map(|d| d.to_string())
                .unwrap_or_default(),
            parameters: Value::Object(tool.input_schema.as_ref().clone()),
        }
    }
}

/// Something that can run tools by name.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Tools available to callers
    fn specs(&self) -> Vec<ToolSpec>;

    /// Run `name` with a JSON object of arguments and return its text output.
    async fn call(&self, name: &str, arguments: Value) -> Result<String>;
}

async fn with_timeout<F: Future>(limit: Duration, what: &str, fut: F) -> Result<F::Output> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| ReplError::Timeout(format!("{} took longer than {}s", what, limit.as_secs())))
}

/// Join the text parts of a tool result; other content is shown as JSON.
pub fn render_result(result: &CallToolResult) -> String {
    result
        .content
        .iter()
        .map(|content| match content.as_text() {
            Some(text) => text.text.clone(),
            None => serde_json::to_string(content).unwrap_or_default(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A connected MCP server
pub struct McpSession {
    name: String,
    service: RunningService<RoleClient, ()>,
    tools: Vec<Tool>,
    timeout: Duration,
}

impl std::fmt::Debug for McpSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpSession")
            .field("name", &self.name)
            .field("tool_count", &self.tools.len())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl McpSession {
    /// Spawn `entry` and connect to it over stdio.
    pub async fn connect(name: &str, entry: &ServerEntry, timeout: Duration) -> Result<Self> {
        let mut cmd = Command::new(&entry.command);
        cmd.args(&entry.args);
        for (key, value) in entry.expanded_env(|k| std::env::var(k).ok()) {
            cmd.env(key, value);
        }
        // Server logs share the terminal; keep them quiet unless asked
        if std::env::var_os("RUST_LOG").is_none() && !entry.env.contains_key("RUST_LOG") {
            cmd.env("RUST_LOG", "warn");
        }

        tracing::debug!("Launching MCP server '{}': {} {:?}", name, entry.command, entry.args);
        let transport = TokioChildProcess::new(cmd)
            .map_err(|e| ReplError::Mcp(format!("failed to launch '{}': {}", entry.command, e)))?;

        let service = with_timeout(timeout, "MCP handshake", ().serve(transport))
            .await?
            .map_err(|e| ReplError::Mcp(format!("failed to connect to MCP server '{name}': {e}")))?;

        Self::from_service(name, service, timeout).await
    }

    /// Wrap an already connected service and fetch its tools.
    pub async fn from_service(
        name: &str,
        service: RunningService<RoleClient, ()>,
        timeout: Duration,
    ) -> Result<Self> {
        let listed = with_timeout(timeout, "tools/list", service.list_tools(Default::default()))
            .await?
            .map_err(|e| ReplError::Mcp(format!("tools/list failed for '{name}': {e}")))?;

        tracing::debug!("MCP server '{}' offers {} tools", name, listed.tools.len());

        Ok(Self {
            name: name.to_string(),
            service,
            tools: listed.tools,
            timeout,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.name == name)
    }

    /// Call a tool and return the raw MCP result.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<CallToolResult> {
        let arguments = match arguments {
            Value::Object(map) => Some(map),
            Value::Null => None,
            other => {
                return Err(ReplError::Mcp(format!(
                    "arguments for {name} must be a JSON object, got {other}"
                )))
            }
        };

        let params = CallToolRequestParam {
            name: name.to_string().into(),
            arguments,
        };

        with_timeout(self.timeout, name, self.service.call_tool(params))
            .await?
            .map_err(|e| ReplError::Mcp(format!("tools/call failed for {name}: {e}")))
    }

    /// Close the connection; the child process exits with it.
    pub async fn shutdown(self) -> Result<()> {
        self.service
            .cancel()
            .await
            .map_err(|e| ReplError::Mcp(format!("failed to stop MCP server: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl ToolExecutor for McpSession {
    fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(ToolSpec::from).collect()
    }

    async fn call(&self, name: &str, arguments: Value) -> Result<String> {
        let result = self.call_tool(name, arguments).await?;
        Ok(render_result(&result))
    }
}
