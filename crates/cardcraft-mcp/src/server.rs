//! Registry-aggregating MCP server served over stdio.

use rmcp::model::{
    CallToolRequestParam, CallToolResult, ErrorData, Implementation, ListToolsResult,
    PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{ServerHandler, ServiceExt};
use serde_json::Value;

use crate::registry::{ToolRegistry, ToolResult};

const INSTRUCTIONS: &str = "Cardcraft exposes course and card authoring for a \
microlearning platform: create courses, add the seven card types, update \
cards, and generate audio narration and images that upload straight to \
storage. Generate media first, then attach the returned URL and provenance \
parameters when creating the card.";

/// MCP server over an ordered set of tool registries.
///
/// `list_tools` concatenates every registry's descriptors; `call_tool` asks
/// each registry in turn until one claims the name.
#[derive(Default)]
pub struct CardcraftServer {
    registries: Vec<Box<dyn ToolRegistry>>,
}

impl CardcraftServer {
    /// Create a server with no registries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool registry.
    pub fn with_registry(mut self, registry: impl ToolRegistry + 'static) -> Self {
        self.registries.push(Box::new(registry));
        self
    }

    /// Descriptors for every tool across all registries.
    pub fn tools(&self) -> Vec<Tool> {
        self.registries
            .iter()
            .flat_map(|registry| registry.tools())
            .collect()
    }

    /// Dispatch a call to the first registry that claims the name.
    pub fn dispatch(&self, name: &str, args: Value) -> Option<ToolResult> {
        self.registries
            .iter()
            .find_map(|registry| registry.call(name, args.clone()))
    }

    /// Serve MCP over stdin/stdout until the client disconnects.
    pub async fn serve_stdio(self) -> anyhow::Result<()> {
        let service = self.serve(rmcp::transport::stdio()).await?;
        service.waiting().await?;
        Ok(())
    }
}

impl ServerHandler for CardcraftServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::V_2024_11_05)
            .with_server_info(Implementation::from_build_env())
            .with_instructions(INSTRUCTIONS.to_string())
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult {
            tools: self.tools(),
            ..Default::default()
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let args = request
            .arguments
            .map(Value::Object)
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()));

        tracing::debug!(tool = %request.name, "tool call");

        match self.dispatch(&request.name, args) {
            Some(future) => future.await,
            None => Err(ErrorData::invalid_params(
                format!("Unknown tool: {}", request.name),
                None,
            )),
        }
    }
}
