//! Integration tests for the Mem0 tool handlers
//!
//! These tests drive `MemoryTools` against a recording mock store and check:
//! - payload shaping and default scoping
//! - local validation errors
//! - remote error envelopes
//! - settings precedence and the client cache

mod common;

use common::mocks::{MockMemoryStore, StoreCall, mock_cache, mock_tools, test_env};
use mem0_mcp::mem0::Mem0Error;
use mem0_mcp::types::{
    AddMemoryArgs, AppError, GetMemoriesArgs, MemoryIdArgs, Scope, ScopeArgs, SearchMemoriesArgs,
    ToolMessage, UpdateMemoryArgs,
};
use mem0_mcp::utils::config::{EnvSettings, SessionConfig, StaticConfig};
use mem0_mcp::MemoryTools;
use serde_json::{Map, Value, json};

fn parse(raw: &str) -> Value {
    serde_json::from_str(raw).expect("tool output must be JSON")
}

fn filters(value: Value) -> Option<Map<String, Value>> {
    value.as_object().cloned()
}

// ============= add_memory =============

#[tokio::test]
async fn test_add_memory_derives_message_from_text() {
    let store = MockMemoryStore::new(json!({"results": [{"id": "m1"}]}));
    let tools = mock_tools(store.clone());

    let out = tools
        .add_memory(
            AddMemoryArgs {
                text: Some("hello".to_string()),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();

    assert_eq!(parse(&out), json!({"results": [{"id": "m1"}]}));

    let calls = store.calls();
    assert_eq!(calls.len(), 1);
    let StoreCall::Add(payload) = &calls[0] else {
        panic!("expected add, got {:?}", calls[0]);
    };
    assert_eq!(payload.messages, vec![ToolMessage::user("hello")]);
    assert_eq!(payload.scope.user_id.as_deref(), Some("alice"));
    assert!(!payload.enable_graph);
}

#[tokio::test]
async fn test_add_memory_prefers_messages_over_text() {
    let store = MockMemoryStore::default();
    let tools = mock_tools(store.clone());
    let conversation = vec![
        ToolMessage {
            role: "user".to_string(),
            content: "I moved to Lisbon".to_string(),
        },
        ToolMessage {
            role: "assistant".to_string(),
            content: "Noted!".to_string(),
        },
    ];

    tools
        .add_memory(
            AddMemoryArgs {
                text: Some("ignored".to_string()),
                messages: Some(conversation.clone()),
                user_id: Some("bob".to_string()),
                agent_id: Some("travel".to_string()),
                metadata: filters(json!({"source": "chat"})),
                enable_graph: Some(true),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();

    let StoreCall::Add(payload) = &store.calls()[0] else {
        panic!("expected add");
    };
    assert_eq!(payload.messages, conversation);
    assert_eq!(payload.scope.user_id.as_deref(), Some("bob"));
    assert_eq!(payload.scope.agent_id.as_deref(), Some("travel"));
    assert_eq!(payload.scope.app_id, None);
    assert!(payload.enable_graph);

    let wire = serde_json::to_value(payload).unwrap();
    assert_eq!(wire["metadata"], json!({"source": "chat"}));
    assert!(wire.get("text").is_none());
    assert!(wire.get("app_id").is_none());
}

#[tokio::test]
async fn test_add_memory_without_content_is_rejected_locally() {
    let store = MockMemoryStore::default();
    let tools = mock_tools(store.clone());

    let out = tools.add_memory(AddMemoryArgs::default(), None).await.unwrap();
    let out = parse(&out);

    assert_eq!(out["error"], "messages_missing");
    assert!(out["detail"].as_str().unwrap().contains("text"));
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_add_memory_empty_inputs_count_as_missing() {
    let store = MockMemoryStore::default();
    let tools = mock_tools(store.clone());

    let out = tools
        .add_memory(
            AddMemoryArgs {
                text: Some(String::new()),
                messages: Some(vec![]),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();

    assert_eq!(parse(&out)["error"], "messages_missing");
    assert!(store.calls().is_empty());
}

// ============= search / get =============

#[tokio::test]
async fn test_search_memories_scopes_filters() {
    let store = MockMemoryStore::new(json!([]));
    let tools = mock_tools(store.clone());

    tools
        .search_memories(
            SearchMemoriesArgs {
                query: "coffee".to_string(),
                filters: filters(json!({"agent_id": "barista"})),
                limit: Some(5),
                enable_graph: None,
            },
            None,
        )
        .await
        .unwrap();

    let StoreCall::Search(payload) = &store.calls()[0] else {
        panic!("expected search");
    };
    assert_eq!(payload.query, "coffee");
    assert_eq!(
        payload.filters,
        json!({"AND": [{"user_id": "alice"}, {"agent_id": "barista"}]})
    );
    assert_eq!(payload.limit, Some(5));
    assert!(!payload.enable_graph);
}

#[tokio::test]
async fn test_search_memories_keeps_explicit_user() {
    let store = MockMemoryStore::new(json!([]));
    let tools = mock_tools(store.clone());

    tools
        .search_memories(
            SearchMemoriesArgs {
                query: "coffee".to_string(),
                filters: filters(json!({"AND": [{"user_id": "bob"}]})),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();

    let StoreCall::Search(payload) = &store.calls()[0] else {
        panic!("expected search");
    };
    assert_eq!(payload.filters, json!({"AND": [{"user_id": "bob"}]}));
}

#[tokio::test]
async fn test_search_memories_malformed_and_fails_the_call() {
    let store = MockMemoryStore::default();
    let tools = mock_tools(store.clone());

    let err = tools
        .search_memories(
            SearchMemoriesArgs {
                query: "coffee".to_string(),
                filters: filters(json!({"AND": "agent_id=barista"})),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidFilter(_)));
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_get_memories_defaults_filters_and_pagination() {
    let store = MockMemoryStore::new(json!({"results": []}));
    let tools = mock_tools(store.clone());

    tools
        .get_memories(
            GetMemoriesArgs {
                page: Some(2),
                page_size: Some(25),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();

    let StoreCall::GetAll(payload) = &store.calls()[0] else {
        panic!("expected get_all");
    };
    assert_eq!(payload.filters, json!({"AND": [{"user_id": "alice"}]}));
    assert_eq!(payload.page, Some(2));
    assert_eq!(payload.page_size, Some(25));
}

// ============= single memory =============

#[tokio::test]
async fn test_single_memory_tools_forward_ids() {
    let store = MockMemoryStore::new(json!({"id": "m1"}));
    let tools = mock_tools(store.clone());

    tools
        .get_memory(MemoryIdArgs { memory_id: "m1".into() }, None)
        .await
        .unwrap();
    tools
        .update_memory(
            UpdateMemoryArgs {
                memory_id: "m1".into(),
                text: "prefers green tea".into(),
            },
            None,
        )
        .await
        .unwrap();
    tools
        .delete_memory(MemoryIdArgs { memory_id: "m1".into() }, None)
        .await
        .unwrap();
    tools.list_entities(None).await.unwrap();

    assert_eq!(
        store.calls(),
        vec![
            StoreCall::Get("m1".into()),
            StoreCall::Update("m1".into(), "prefers green tea".into()),
            StoreCall::Delete("m1".into()),
            StoreCall::Users,
        ]
    );
}

// ============= bulk deletes =============

#[tokio::test]
async fn test_delete_all_memories_defaults_user() {
    let store = MockMemoryStore::default();
    let tools = mock_tools(store.clone());

    tools
        .delete_all_memories(
            ScopeArgs {
                run_id: Some("run-7".into()),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();

    assert_eq!(
        store.calls(),
        vec![StoreCall::DeleteAll(Scope {
            user_id: Some("alice".into()),
            run_id: Some("run-7".into()),
            ..Default::default()
        })]
    );
}

#[tokio::test]
async fn test_delete_entities_requires_scope() {
    let store = MockMemoryStore::default();
    let tools = mock_tools(store.clone());

    let out = tools
        .delete_entities(ScopeArgs::default(), None)
        .await
        .unwrap();

    assert_eq!(parse(&out)["error"], "scope_missing");
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_delete_entities_does_not_inject_default_user() {
    let store = MockMemoryStore::default();
    let tools = mock_tools(store.clone());

    tools
        .delete_entities(
            ScopeArgs {
                agent_id: Some("planner".into()),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();

    assert_eq!(
        store.calls(),
        vec![StoreCall::DeleteUsers(Scope {
            agent_id: Some("planner".into()),
            ..Default::default()
        })]
    );
}

#[tokio::test]
async fn test_delete_entities_targets_first_identifier() {
    let store = MockMemoryStore::new(json!({"message": "Entity deleted successfully."}));
    let tools = mock_tools(store.clone());

    let out = tools
        .delete_entities(
            ScopeArgs {
                user_id: Some("alice".into()),
                agent_id: Some("planner".into()),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();

    assert_eq!(parse(&out)["message"], "Entity deleted successfully.");
    assert_eq!(
        store.calls(),
        vec![StoreCall::DeleteUsers(Scope {
            user_id: Some("alice".into()),
            ..Default::default()
        })]
    );
}

// ============= error envelope =============

#[tokio::test]
async fn test_remote_rate_limit_is_returned_as_envelope() {
    let store = MockMemoryStore::failing(Mem0Error::from_response(
        429,
        r#"{"reason":"rate_limited"}"#,
    ));
    let tools = mock_tools(store);

    let out = tools
        .search_memories(
            SearchMemoriesArgs {
                query: "anything".into(),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
    let out = parse(&out);

    assert_eq!(out["status"], 429);
    assert_eq!(out["payload"], json!({"reason": "rate_limited"}));
    assert!(out["error"].is_string());
}

// ============= settings =============

#[tokio::test]
async fn test_session_overrides_key_user_and_graph() {
    let store = MockMemoryStore::default();
    let (cache, keys) = mock_cache(store.clone());
    let tools = MemoryTools::with_cache(StaticConfig::default(), test_env(), cache).unwrap();

    let session = SessionConfig {
        mem0_api_key: Some("session-key".into()),
        default_user_id: Some("carol".into()),
        enable_graph_default: Some(true),
    };

    tools
        .add_memory(
            AddMemoryArgs {
                text: Some("likes jazz".into()),
                ..Default::default()
            },
            Some(&session),
        )
        .await
        .unwrap();

    assert_eq!(*keys.lock(), vec!["session-key".to_string()]);
    let StoreCall::Add(payload) = &store.calls()[0] else {
        panic!("expected add");
    };
    assert_eq!(payload.scope.user_id.as_deref(), Some("carol"));
    assert!(payload.enable_graph);
}

#[tokio::test]
async fn test_static_config_beats_environment() {
    let store = MockMemoryStore::default();
    let (cache, keys) = mock_cache(store.clone());
    let static_config = StaticConfig {
        mem0_api_key: Some("file-key".into()),
        default_user_id: Some("dave".into()),
        ..Default::default()
    };
    let tools = MemoryTools::with_cache(static_config, test_env(), cache).unwrap();

    tools.delete_all_memories(ScopeArgs::default(), None).await.unwrap();

    assert_eq!(*keys.lock(), vec!["file-key".to_string()]);
    assert_eq!(
        store.calls(),
        vec![StoreCall::DeleteAll(Scope {
            user_id: Some("dave".into()),
            ..Default::default()
        })]
    );
}

#[tokio::test]
async fn test_client_is_cached_per_key() {
    let store = MockMemoryStore::default();
    let (cache, keys) = mock_cache(store);
    let tools = MemoryTools::with_cache(StaticConfig::default(), test_env(), cache).unwrap();

    tools.list_entities(None).await.unwrap();
    tools.list_entities(None).await.unwrap();

    assert_eq!(keys.lock().len(), 1);
    assert_eq!(tools.cache().len(), 1);
}

#[tokio::test]
async fn test_unusable_session_key_is_returned_as_envelope() {
    let tools = MemoryTools::new(StaticConfig::default(), test_env()).unwrap();
    let session = SessionConfig {
        mem0_api_key: Some("bad\nkey".into()),
        ..Default::default()
    };

    let out = tools.list_entities(Some(&session)).await.unwrap();
    let out = parse(&out);

    assert_eq!(out["error"], "client_unavailable");
    assert!(out["detail"].as_str().unwrap().contains("invalid characters"));
    assert!(tools.cache().is_empty());
}

#[test]
fn test_missing_api_key_fails_at_construction() {
    let (cache, _) = mock_cache(MockMemoryStore::default());
    let env = EnvSettings {
        default_user_id: Some("alice".into()),
        ..Default::default()
    };

    let err = MemoryTools::with_cache(StaticConfig::default(), env, cache).unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
}
