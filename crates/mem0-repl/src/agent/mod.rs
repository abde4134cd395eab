//! Memory agent - an LLM tool-calling loop over the Mem0 MCP tools
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint. Each prompt
//! runs until the model answers without requesting tools, or until the
//! iteration bound is hit.

use crate::config::ReplConfig;
use crate::session::{ToolExecutor, ToolSpec};
use crate::{ReplError, Result, MAX_TOOL_ITERATIONS};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// System prompt for the demo agent
pub const MEM0_GUIDE: &str = "You are Mem0Guide, a friendly assistant whose ONLY external actions are the Mem0 MCP tools. \
Use the configured default user id unless the user names another one, and scope every filter to it. \
Treat any new preference, fact or personal detail as durable and call add_memory right away, even when the user does not say 'remember', unless they opt out. \
When a new detail replaces an older one, store a memory that states both so the latest truth is clear. \
Only search, list ids, confirm and then update or delete when the user refers to an existing memory or several matches make a change risky. \
Answer get, show and list requests with a single get_memories or search_memories call, expanding synonyms yourself. \
Ask for the scope once before delete_all_memories or delete_entities; if the user confirms, run it without asking again. \
Graph memory stays off unless the user asks for it. \
Say which tool you ran, summarize the outcome in plain words and offer one short next step. \
Mention memory ids only when the next action depends on them.";

/// Role of a message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A request to call a tool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

/// A message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn assistant(content: impl Into<String>, tool_calls: Vec<ToolCallRequest>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls,
            tool_call_id: None,
        }
    }

    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: Some(tool_call_id.into()),
        }
    }

    /// Chat completions wire format
    fn to_wire(&self) -> Value {
        match self.role {
            Role::System | Role::User => json!({
                "role": self.role,
                "content": self.content,
            }),
            Role::Assistant if self.tool_calls.is_empty() => json!({
                "role": "assistant",
                "content": self.content,
            }),
            Role::Assistant => {
                let calls: Vec<Value> = self
                    .tool_calls
                    .iter()
                    .map(|tc| {
                        json!({
                            "id": tc.id,
                            "type": "function",
                            "function": {
                                "name": tc.name,
                                "arguments": tc.arguments.to_string(),
                            }
                        })
                    })
                    .collect();
                json!({
                    "role": "assistant",
                    "content": if self.content.is_empty() { Value::Null } else { json!(self.content) },
                    "tool_calls": calls,
                })
            }
            Role::Tool => json!({
                "role": "tool",
                "tool_call_id": self.tool_call_id,
                "content": self.content,
            }),
        }
    }
}

/// Record of a tool call execution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCallRecord {
    pub id: String,
    pub name: String,
    pub arguments: Value,
    /// Text handed back to the model
    pub result: String,
    pub success: bool,
    pub duration_ms: u64,
}

/// One model reply
#[derive(Debug, Clone, PartialEq)]
pub struct LLMResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCallRequest>,
    pub finish_reason: String,
}

/// Result of a complete prompt
#[derive(Debug)]
pub struct AgentResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCallRecord>,
    pub iterations: usize,
}

/// Chat agent that can act through a [`ToolExecutor`]
pub struct MemoryAgent {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    system_prompt: String,
    history: Vec<Message>,
    max_iterations: usize,
}

impl std::fmt::Debug for MemoryAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryAgent")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("history_len", &self.history.len())
            .finish()
    }
}

impl MemoryAgent {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            system_prompt: MEM0_GUIDE.to_string(),
            history: Vec::new(),
            max_iterations: MAX_TOOL_ITERATIONS,
        }
    }

    /// `None` when no LLM key is configured.
    pub fn from_config(config: &ReplConfig) -> Option<Self> {
        config
            .openai_api_key
            .as_ref()
            .map(|key| Self::new(&config.openai_base_url, key, &config.model))
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Run one user prompt to completion.
    ///
    /// On error the history is rolled back to where it was before the
    /// prompt, so a failed turn leaves no half-finished tool exchange.
    pub async fn execute(&mut self, prompt: &str, tools: &dyn ToolExecutor) -> Result<AgentResponse> {
        let checkpoint = self.history.len();
        let result = self.run_turn(prompt, tools).await;
        if result.is_err() {
            self.history.truncate(checkpoint);
        }
        result
    }

    async fn run_turn(&mut self, prompt: &str, tools: &dyn ToolExecutor) -> Result<AgentResponse> {
        self.history.push(Message::user(prompt));

        let specs = tools.specs();
        let mut all_tool_calls = Vec::new();

        for iteration in 1..=self.max_iterations {
            let response = self.complete(&specs).await?;
            tracing::debug!(
                iteration,
                finish_reason = %response.finish_reason,
                tool_calls = response.tool_calls.len(),
                "LLM reply"
            );

            if response.tool_calls.is_empty() {
                self.history
                    .push(Message::assistant(response.content.clone(), Vec::new()));
                return Ok(AgentResponse {
                    content: response.content,
                    tool_calls: all_tool_calls,
                    iterations: iteration,
                });
            }

            self.history.push(Message::assistant(
                response.content.clone(),
                response.tool_calls.clone(),
            ));

            for call in &response.tool_calls {
                let record = Self::run_tool(call, &specs, tools).await;
                self.history
                    .push(Message::tool_result(&record.id, &record.result));
                all_tool_calls.push(record);
            }
        }

        Err(ReplError::Llm(format!(
            "Max tool iterations ({}) exceeded",
            self.max_iterations
        )))
    }

    /// Failures become error text for the model instead of ending the turn.
    async fn run_tool(call: &ToolCallRequest, specs: &[ToolSpec], tools: &dyn ToolExecutor) -> ToolCallRecord {
        let start = std::time::Instant::now();

        let outcome = if specs.iter().any(|s| s.name == call.name) {
            tools.call(&call.name, call.arguments.clone()).await
        } else {
            Err(ReplError::Mcp(format!("unknown tool: {}", call.name)))
        };

        let (result, success) = match outcome {
            Ok(text) => (text, true),
            Err(e) => {
                tracing::warn!("Tool {} failed: {}", call.name, e);
                (json!({ "error": e.to_string() }).to_string(), false)
            }
        };

        ToolCallRecord {
            id: call.id.clone(),
            name: call.name.clone(),
            arguments: call.arguments.clone(),
            result,
            success,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    async fn complete(&self, specs: &[ToolSpec]) -> Result<LLMResponse> {
        let mut messages = vec![json!({ "role": "system", "content": self.system_prompt })];
        messages.extend(self.history.iter().map(Message::to_wire));

        let mut body = json!({
            "model": self.model,
            "messages": messages,
        });
        if !specs.is_empty() {
            let tools: Vec<Value> = specs
                .iter()
                .map(|s| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": s.name,
                            "description": s.description,
                            "parameters": s.parameters,
                        }
                    })
                })
                .collect();
            body["tools"] = Value::Array(tools);
        }

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ReplError::Llm(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ReplError::Llm(format!(
                "Chat completion failed ({}): {}",
                status, text
            )));
        }

        let response_json: Value = response
            .json()
            .await
            .map_err(|e| ReplError::Llm(format!("Failed to parse response: {}", e)))?;

        parse_completion(&response_json)
    }
}

/// Extract the first choice of a chat completion.
pub fn parse_completion(json: &Value) -> Result<LLMResponse> {
    let choice = json
        .get("choices")
        .and_then(|c| c.get(0))
        .ok_or_else(|| ReplError::Llm("No choices in response".into()))?;
    let message = choice
        .get("message")
        .ok_or_else(|| ReplError::Llm("No message in response".into()))?;

    let content = message
        .get("content")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    let tool_calls = message
        .get("tool_calls")
        .and_then(Value::as_array)
        .map(|calls| {
            calls
                .iter()
                .enumerate()
                .filter_map(|(i, tc)| {
                    let func = tc.get("function")?;
                    let name = func.get("name").and_then(Value::as_str)?.to_string();
                    // Arguments arrive as a JSON-encoded string
                    let arguments = match func.get("arguments") {
                        Some(Value::String(raw)) => {
                            serde_json::from_str(raw).unwrap_or_else(|_| json!({}))
                        }
                        Some(other) => other.clone(),
                        None => json!({}),
                    };
                    let id = tc
                        .get("id")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("call_{i}"));
                    Some(ToolCallRequest {
                        id,
                        name,
                        arguments,
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let finish_reason = choice
        .get("finish_reason")
        .and_then(Value::as_str)
        .unwrap_or("stop")
        .to_string();

    Ok(LLMResponse {
        content,
        tool_calls,
        finish_reason,
    })
}
