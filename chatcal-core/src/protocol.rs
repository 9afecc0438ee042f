//! Tool-call protocol types.
//!
//! Defines the transport-agnostic JSON shape used to invoke calendar tools:
//! a request names a tool and supplies a key-value input bag, and the
//! response is either `{"result": ...}` or `{"error": "..."}`.

use serde::{Deserialize, Serialize};

use crate::error::ChatCalError;

/// A tool invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolRequest {
    pub tool: String,
    #[serde(default)]
    pub input: serde_json::Value,
}

/// Outcome of a tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolResponse {
    Result(serde_json::Value),
    Error(String),
}

impl ToolResponse {
    /// A structured result payload.
    pub fn result(value: impl Serialize) -> ToolResponse {
        match serde_json::to_value(value) {
            Ok(v) => ToolResponse::Result(v),
            Err(e) => ToolResponse::Error(
                ChatCalError::Internal(format!("failed to encode result: {e}")).to_string(),
            ),
        }
    }

    /// A plain-text result.
    pub fn text(msg: impl Into<String>) -> ToolResponse {
        ToolResponse::Result(serde_json::Value::String(msg.into()))
    }

    pub fn error(msg: impl Into<String>) -> ToolResponse {
        ToolResponse::Error(msg.into())
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"Failed to encode response"}"#.to_string())
    }
}
