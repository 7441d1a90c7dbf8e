//! Terminal-step tools: confirmation, confirmation email, hang-up.

use std::time::Instant;

use async_trait::async_trait;

use crate::context::CallContext;
use crate::error::ToolError;
use crate::tools::tool::{Tool, ToolDomain, ToolOutput};

use super::SharedController;
use super::intake::relay;

/// Latch that the patient verified everything read back to them.
pub struct ConfirmInformationTool {
    controller: SharedController,
}

impl ConfirmInformationTool {
    pub fn new(controller: SharedController) -> Self {
        Self { controller }
    }
}

#[async_trait]
impl Tool for ConfirmInformationTool {
    fn name(&self) -> &str {
        "confirm_information"
    }

    fn description(&self) -> &str {
        "Mark the collected information as confirmed. Only call this after reading \
         everything back to the patient and hearing them agree."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object", "properties": {} })
    }

    async fn execute(
        &self,
        _params: serde_json::Value,
        _ctx: &CallContext,
    ) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let message = self.controller.lock().await.confirm_information();
        Ok(ToolOutput::text(message, start.elapsed()))
    }

    fn domain(&self) -> ToolDomain {
        ToolDomain::Call
    }
}

pub struct SendConfirmationEmailTool {
    controller: SharedController,
}

impl SendConfirmationEmailTool {
    pub fn new(controller: SharedController) -> Self {
        Self { controller }
    }
}

#[async_trait]
impl Tool for SendConfirmationEmailTool {
    fn name(&self) -> &str {
        "send_confirmation_email"
    }

    fn description(&self) -> &str {
        "Email the appointment details to the patient. Requires an email address \
         on file and confirmed information."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object", "properties": {} })
    }

    async fn execute(
        &self,
        _params: serde_json::Value,
        ctx: &CallContext,
    ) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        tracing::debug!(call_id = %ctx.call_id, tool = self.name(), "Sending confirmation email");
        let result = self.controller.lock().await.send_confirmation_email().await;
        Ok(relay(result, start.elapsed()))
    }

    fn domain(&self) -> ToolDomain {
        ToolDomain::Call
    }
}

pub struct EndCallTool {
    controller: SharedController,
}

impl EndCallTool {
    pub fn new(controller: SharedController) -> Self {
        Self { controller }
    }
}

#[async_trait]
impl Tool for EndCallTool {
    fn name(&self) -> &str {
        "end_call"
    }

    fn description(&self) -> &str {
        "End the call. Refused while information is missing, unconfirmed, or a \
         requested confirmation email has not been sent; the reply says what remains."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object", "properties": {} })
    }

    async fn execute(
        &self,
        _params: serde_json::Value,
        _ctx: &CallContext,
    ) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let decision = self.controller.lock().await.end_call().await;
        let output = serde_json::json!({
            "status": if decision.is_granted() { "ok" } else { "rejected" },
            "granted": decision.is_granted(),
            "message": decision.message(),
        });
        Ok(ToolOutput::success(output, start.elapsed()))
    }

    fn domain(&self) -> ToolDomain {
        ToolDomain::Call
    }
}
