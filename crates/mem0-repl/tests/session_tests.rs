//! End-to-end tests: REPL session -> MCP server -> mocked Mem0 API
//!
//! The real server runs in-process on a duplex pipe and talks to wiremock
//! instead of api.mem0.ai.

use mem0_mcp::{EnvSettings, Mem0McpServer, MemoryTools, StaticConfig};
use mem0_repl::repl::{parse_line, Outcome, Repl};
use mem0_repl::session::{McpSession, ToolExecutor};
use mem0_repl::{MemoryAgent, ReplError};
use rmcp::ServiceExt;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn connect(mem0: &MockServer) -> McpSession {
    let static_config = StaticConfig {
        api_host: Some(mem0.uri()),
        ..Default::default()
    };
    let env = EnvSettings {
        api_key: Some("m0-test".to_string()),
        default_user_id: Some("alice".to_string()),
        ..Default::default()
    };
    let tools = MemoryTools::new(static_config, env).unwrap();

    let (server_io, client_io) = tokio::io::duplex(4096);
    tokio::spawn(async move {
        if let Ok(running) = Mem0McpServer::new(tools).serve(server_io).await {
            let _ = running.waiting().await;
        }
    });

    let service = ().serve(client_io).await.unwrap();
    McpSession::from_service("mem0-test", service, Duration::from_secs(5))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_session_lists_server_tools() {
    let mem0 = MockServer::start().await;
    let session = connect(&mem0).await;

    assert_eq!(session.name(), "mem0-test");
    assert_eq!(session.tools().len(), 9);
    assert!(session.has_tool("delete_entities"));

    let specs = session.specs();
    let add = specs.iter().find(|s| s.name == "add_memory").unwrap();
    assert!(add.description.starts_with("Store a user"));
    assert_eq!(add.parameters["type"], "object");

    session.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_session_call_reaches_mem0() {
    let mem0 = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/memories/search/"))
        .and(header("authorization", "Token m0-test"))
        .and(body_partial_json(json!({
            "query": "tea",
            "filters": {"AND": [{"user_id": "alice"}]}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "m1", "memory": "Likes green tea"}])))
        .expect(1)
        .mount(&mem0)
        .await;

    let session = connect(&mem0).await;
    let text = session
        .call("search_memories", json!({"query": "tea"}))
        .await
        .unwrap();

    let out: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(out[0]["memory"], "Likes green tea");

    session.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_session_rejects_non_object_arguments() {
    let mem0 = MockServer::start().await;
    let session = connect(&mem0).await;

    let err = session.call("get_memory", json!(["m1"])).await.unwrap_err();
    assert!(matches!(err, ReplError::Mcp(_)));

    session.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_call_command_surfaces_mem0_errors() {
    let mem0 = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/entities/"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({"reason": "rate_limited"})))
        .mount(&mem0)
        .await;

    let mut repl = Repl::new(connect(&mem0).await, None);
    let Outcome::Print(text) = repl.handle(parse_line("/call list_entities")).await else {
        panic!("expected printed envelope");
    };

    let envelope: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(envelope["status"], 429);
    assert_eq!(envelope["payload"], json!({"reason": "rate_limited"}));

    repl.into_executor().shutdown().await.unwrap();
}

#[tokio::test]
async fn test_agent_stores_memory_through_server() {
    let mem0 = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/memories/"))
        .and(body_partial_json(json!({
            "messages": [{"role": "user", "content": "Relocating to San Francisco"}],
            "user_id": "alice"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": [{"id": "m9", "event": "ADD"}]})))
        .expect(1)
        .mount(&mem0)
        .await;

    let llm = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {
                            "name": "add_memory",
                            "arguments": "{\"text\":\"Relocating to San Francisco\"}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        })))
        .up_to_n_times(1)
        .mount(&llm)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": {"role": "assistant", "content": "Got it, San Francisco it is."},
                "finish_reason": "stop"
            }]
        })))
        .mount(&llm)
        .await;

    let agent = MemoryAgent::new(llm.uri(), "sk-test", "gpt-5");
    let mut repl = Repl::new(connect(&mem0).await, Some(agent));

    let Outcome::Reply(text) = repl
        .handle(parse_line("I'm relocating to San Francisco"))
        .await
    else {
        panic!("expected agent reply");
    };
    assert!(text.starts_with("Got it, San Francisco it is."));

    repl.into_executor().shutdown().await.unwrap();
}
