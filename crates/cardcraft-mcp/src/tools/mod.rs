//! Tool groups exposed by the Cardcraft server.
//!
//! Result conventions follow the upstream platform tools: API-backed tools
//! answer with pretty-printed JSON (failures as an `{"error": ...}` value),
//! media tools answer with a human-readable status message (failures as an
//! `Error: ...` line). Only malformed tool arguments become protocol
//! errors.

pub mod cards;
pub mod courses;
pub mod diagnostics;
pub mod media;

pub use cards::CardTools;
pub use courses::CourseTools;
pub use diagnostics::DiagnosticTools;
pub use media::MediaTools;

use rmcp::model::{CallToolResult, Content, ErrorData};
use serde_json::{Value, json};

use cardcraft_core::Error;

/// Serialize a value to a successful `CallToolResult`.
pub(crate) fn serialize_response<T: serde::Serialize>(
    value: &T,
) -> Result<CallToolResult, ErrorData> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| ErrorData::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// A plain-text tool result.
pub(crate) fn text_result(message: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(message.into())])
}

/// Render an API-tool outcome: payloads as pretty JSON, failures as an
/// `{"error": ...}` value.
pub(crate) fn api_result(outcome: cardcraft_core::Result<Value>) -> Result<CallToolResult, ErrorData> {
    match outcome {
        Ok(value) => serialize_response(&value),
        Err(err) => serialize_response(&json!({"error": err.to_string()})),
    }
}

/// Render a media-tool failure as a descriptive error line.
pub(crate) fn error_text(err: &Error) -> CallToolResult {
    text_result(format!("Error: {err}"))
}

/// Map a tool-argument deserialization failure to a protocol error.
pub(crate) fn invalid_args(err: serde_json::Error) -> ErrorData {
    ErrorData::invalid_params(err.to_string(), None)
}

#[cfg(test)]
pub(crate) fn text_of(result: &CallToolResult) -> String {
    result
        .content
        .first()
        .and_then(|content| content.as_text())
        .map(|text| text.text.clone())
        .unwrap_or_default()
}
