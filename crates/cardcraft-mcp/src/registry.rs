//! Tool registry abstraction over the MCP model types.
//!
//! Domain tool groups implement [`ToolRegistry`]: they describe their tools
//! as `rmcp` descriptors and dispatch calls by name into boxed futures. The
//! server aggregates any number of registries.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use rmcp::model::{CallToolResult, ErrorData, Tool};
use serde_json::Value;

/// Boxed future returned by a tool call.
pub type ToolResult = Pin<Box<dyn Future<Output = Result<CallToolResult, ErrorData>> + Send>>;

/// A named group of MCP tools.
pub trait ToolRegistry: Send + Sync {
    /// Descriptors for every tool this registry serves.
    fn tools(&self) -> Vec<Tool>;

    /// Dispatch a call by tool name.
    ///
    /// Returns `None` when the name does not belong to this registry so
    /// the server can try the next one.
    fn call(&self, name: &str, args: Value) -> Option<ToolResult>;

    /// Number of tools in this registry.
    fn tool_count(&self) -> usize {
        self.tools().len()
    }

    /// Whether this registry serves the named tool.
    fn has_tool(&self, name: &str) -> bool {
        self.tools().iter().any(|tool| tool.name == name)
    }
}

/// Convert a `serde_json::Value::Object` to an `Arc<serde_json::Map>`.
pub fn json_schema(value: Value) -> Arc<serde_json::Map<String, Value>> {
    match value {
        Value::Object(map) => Arc::new(map),
        _ => Arc::new(serde_json::Map::new()),
    }
}

/// Build a `Tool` with a JSON schema.
pub fn make_tool(name: &str, description: &str, schema: Value) -> Tool {
    Tool::new(
        name.to_string(),
        description.to_string(),
        json_schema(schema),
    )
}
