//! Diagnostic tools that work without any configuration.

use serde::Deserialize;
use serde_json::{Value, json};

use crate::registry::{ToolRegistry, ToolResult, make_tool};
use crate::tools::{invalid_args, text_result};
use rmcp::model::Tool;

/// Arguments for the echo_message tool.
#[derive(Debug, Deserialize)]
pub struct EchoArgs {
    /// The message to echo back.
    pub message: String,
}

/// Server identification and connectivity tools.
///
/// These are intentionally credential-free so an unconfigured server can
/// still be probed.
#[derive(Debug, Default)]
pub struct DiagnosticTools;

impl DiagnosticTools {
    /// Create the diagnostic tools.
    pub fn new() -> Self {
        Self
    }
}

impl ToolRegistry for DiagnosticTools {
    fn tools(&self) -> Vec<Tool> {
        vec![
            make_tool(
                "get_server_info",
                "Get basic information about this MCP server",
                json!({
                    "type": "object",
                    "properties": {}
                }),
            ),
            make_tool(
                "echo_message",
                "Echo back a message for testing",
                json!({
                    "type": "object",
                    "properties": {
                        "message": {
                            "type": "string",
                            "description": "The message to echo back"
                        }
                    },
                    "required": ["message"]
                }),
            ),
        ]
    }

    fn call(&self, name: &str, args: Value) -> Option<ToolResult> {
        match name {
            "get_server_info" => Some(Box::pin(async move {
                Ok(text_result(format!(
                    "Cardcraft MCP Server v{} - course and card authoring with \
                     ElevenLabs TTS + Azure Storage",
                    env!("CARGO_PKG_VERSION")
                )))
            })),

            "echo_message" => Some(Box::pin(async move {
                let args: EchoArgs = serde_json::from_value(args).map_err(invalid_args)?;
                Ok(text_result(format!("Echo: {}", args.message)))
            })),

            _ => None,
        }
    }
}
