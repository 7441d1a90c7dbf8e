//! Tool trait and shared types.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::context::CallContext;
use crate::error::ToolError;

/// Which part of the call a tool acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolDomain {
    /// Patient record setters and status.
    Intake,
    /// Provider suggestion and booking.
    Scheduling,
    /// Confirmation, email, hang-up.
    Call,
}

/// Function definition handed to the language model.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Result of a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub result: serde_json::Value,
    pub duration: Duration,
}

impl ToolOutput {
    pub fn success(result: serde_json::Value, duration: Duration) -> Self {
        Self { result, duration }
    }

    /// Plain message the dialogue layer should relay.
    pub fn text(message: impl Into<String>, duration: Duration) -> Self {
        Self::success(
            serde_json::json!({ "status": "ok", "message": message.into() }),
            duration,
        )
    }

    /// Recoverable refusal; the conversation continues with `message`.
    pub fn rejected(message: impl Into<String>, duration: Duration) -> Self {
        Self::success(
            serde_json::json!({ "status": "rejected", "message": message.into() }),
            duration,
        )
    }

    /// The `message` field, if any.
    pub fn message(&self) -> Option<&str> {
        self.result.get("message").and_then(|v| v.as_str())
    }

    pub fn is_rejected(&self) -> bool {
        self.result.get("status").and_then(|v| v.as_str()) == Some("rejected")
    }
}

/// A callable operation exposed to the dialogue layer.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the parameters object.
    fn parameters_schema(&self) -> serde_json::Value;

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &CallContext,
    ) -> Result<ToolOutput, ToolError>;

    fn domain(&self) -> ToolDomain {
        ToolDomain::Intake
    }
}

/// Fetch a required string parameter.
pub fn require_str<'a>(params: &'a serde_json::Value, key: &str) -> Result<&'a str, ToolError> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::InvalidParameters(format!("missing '{key}' parameter")))
}

/// Fetch a required boolean parameter. Accepts `"yes"`/`"no"` strings too.
pub fn require_bool(params: &serde_json::Value, key: &str) -> Result<bool, ToolError> {
    match params.get(key) {
        Some(serde_json::Value::Bool(b)) => Ok(*b),
        Some(serde_json::Value::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" => Ok(true),
            "false" | "no" => Ok(false),
            other => Err(ToolError::InvalidParameters(format!(
                "'{key}' must be a boolean, got '{other}'"
            ))),
        },
        _ => Err(ToolError::InvalidParameters(format!(
            "missing '{key}' parameter"
        ))),
    }
}

/// Fetch an optional string parameter.
pub fn optional_str(params: &serde_json::Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}
