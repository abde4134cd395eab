use crate::tools::MemoryTools;
use crate::types::{
    AddMemoryArgs, GetMemoriesArgs, MemoryIdArgs, ScopeArgs, SearchMemoriesArgs, UpdateMemoryArgs,
};
use crate::utils::config::SessionConfig;
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::*,
    service::RequestContext,
    tool, tool_handler, tool_router,
};

const INSTRUCTIONS: &str = "Mem0 memory tools. Scope every call to the configured default user \
unless the user names another. Write new preferences and facts with add_memory; look them up \
with search_memories or get_memories. Confirm exact memory_ids before update_memory or \
delete_memory, and confirm the scope before delete_all_memories or delete_entities. Graph \
memory is opt-in: pass enable_graph=true only when the user asks for it.";

/// MCP Server exposing the Mem0 platform API as tools
#[derive(Clone)]
pub struct Mem0McpServer {
    tools: MemoryTools,
    tool_router: ToolRouter<Self>,
}

/// Session overrides carried in the request `_meta`, if any.
fn session_config(context: &RequestContext<RoleServer>) -> Option<SessionConfig> {
    SessionConfig::from_meta(&context.meta)
}

fn text_result(json: String) -> CallToolResult {
    CallToolResult::success(vec![Content::text(json)])
}

#[tool_router]
impl Mem0McpServer {
    pub fn new(tools: MemoryTools) -> Self {
        Self {
            tools,
            tool_router: Self::tool_router(),
        }
    }

    pub fn tools(&self) -> &MemoryTools {
        &self.tools
    }

    #[tool(description = "Store a user’s new preference, fact, or conversation snippet.")]
    async fn add_memory(
        &self,
        Parameters(args): Parameters<AddMemoryArgs>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let session = session_config(&context);
        let out = self.tools.add_memory(args, session.as_ref()).await?;
        Ok(text_result(out))
    }

    #[tool(description = "Run a semantic search over existing memories.")]
    async fn search_memories(
        &self,
        Parameters(args): Parameters<SearchMemoriesArgs>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let session = session_config(&context);
        let out = self.tools.search_memories(args, session.as_ref()).await?;
        Ok(text_result(out))
    }

    #[tool(description = "Page through memories using filters instead of search.")]
    async fn get_memories(
        &self,
        Parameters(args): Parameters<GetMemoriesArgs>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let session = session_config(&context);
        let out = self.tools.get_memories(args, session.as_ref()).await?;
        Ok(text_result(out))
    }

    #[tool(description = "Delete every memory in the given user/agent/app/run but keep the entity.")]
    async fn delete_all_memories(
        &self,
        Parameters(args): Parameters<ScopeArgs>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let session = session_config(&context);
        let out = self.tools.delete_all_memories(args, session.as_ref()).await?;
        Ok(text_result(out))
    }

    #[tool(description = "List which users/agents/apps/runs currently hold memories.")]
    async fn list_entities(
        &self,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let session = session_config(&context);
        let out = self.tools.list_entities(session.as_ref()).await?;
        Ok(text_result(out))
    }

    #[tool(description = "Fetch a single memory once you know its memory_id.")]
    async fn get_memory(
        &self,
        Parameters(args): Parameters<MemoryIdArgs>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let session = session_config(&context);
        let out = self.tools.get_memory(args, session.as_ref()).await?;
        Ok(text_result(out))
    }

    #[tool(description = "Overwrite an existing memory’s text.")]
    async fn update_memory(
        &self,
        Parameters(args): Parameters<UpdateMemoryArgs>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let session = session_config(&context);
        let out = self.tools.update_memory(args, session.as_ref()).await?;
        Ok(text_result(out))
    }

    #[tool(description = "Delete one memory after the user confirms its memory_id.")]
    async fn delete_memory(
        &self,
        Parameters(args): Parameters<MemoryIdArgs>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let session = session_config(&context);
        let out = self.tools.delete_memory(args, session.as_ref()).await?;
        Ok(text_result(out))
    }

    #[tool(
        description = "Remove a user/agent/app/run record entirely (and cascade-delete its memories)."
    )]
    async fn delete_entities(
        &self,
        Parameters(args): Parameters<ScopeArgs>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let session = session_config(&context);
        let out = self.tools.delete_entities(args, session.as_ref()).await?;
        Ok(text_result(out))
    }
}

#[tool_handler]
impl ServerHandler for Mem0McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "mem0".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: Some("Mem0 MCP Server".into()),
                icons: None,
                website_url: Some("https://mem0.ai".into()),
            },
            instructions: Some(INSTRUCTIONS.into()),
        }
    }
}

/// Start the MCP server with stdio transport and serve until the peer hangs up
pub async fn start_stdio_server(tools: MemoryTools) -> crate::types::Result<()> {
    use rmcp::{ServiceExt, transport::io::stdio};

    let server = Mem0McpServer::new(tools);
    let transport = stdio();

    let service = server
        .serve(transport)
        .await
        .map_err(|e| crate::types::AppError::Internal(format!("MCP server error: {}", e)))?;

    service
        .waiting()
        .await
        .map_err(|e| crate::types::AppError::Internal(format!("MCP server terminated: {}", e)))?;

    Ok(())
}
