//! Provider suggestion and appointment booking tools.

use std::time::Instant;

use async_trait::async_trait;

use crate::context::CallContext;
use crate::error::ToolError;
use crate::tools::tool::{Tool, ToolDomain, ToolOutput, require_str};

use super::SharedController;
use super::intake::relay;

/// Offer up to three providers suited to the chief complaint.
pub struct SuggestProvidersTool {
    controller: SharedController,
}

impl SuggestProvidersTool {
    pub fn new(controller: SharedController) -> Self {
        Self { controller }
    }
}

#[async_trait]
impl Tool for SuggestProvidersTool {
    fn name(&self) -> &str {
        "suggest_providers"
    }

    fn description(&self) -> &str {
        "Suggest the best available providers and their open times for the patient's \
         reason for visit. Read the options to the patient and ask which they prefer."
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
        let result = self.controller.lock().await.suggest_providers();
        Ok(relay(result, start.elapsed()))
    }

    fn domain(&self) -> ToolDomain {
        ToolDomain::Scheduling
    }
}

/// Book the provider and time the patient chose.
pub struct SetAppointmentTool {
    controller: SharedController,
}

impl SetAppointmentTool {
    pub fn new(controller: SharedController) -> Self {
        Self { controller }
    }
}

#[async_trait]
impl Tool for SetAppointmentTool {
    fn name(&self) -> &str {
        "set_appointment"
    }

    fn description(&self) -> &str {
        "Record the provider and appointment time the patient selected."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "provider": { "type": "string", "description": "Provider name, e.g. Dr. Emily Carter" },
                "time": { "type": "string", "description": "Appointment time in YYYY-MM-DD HH:MM format" }
            },
            "required": ["provider", "time"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _ctx: &CallContext,
    ) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let provider = require_str(&params, "provider")?;
        let time = require_str(&params, "time")?;
        let result = self.controller.lock().await.set_appointment(provider, time);
        Ok(relay(result, start.elapsed()))
    }

    fn domain(&self) -> ToolDomain {
        ToolDomain::Scheduling
    }
}
