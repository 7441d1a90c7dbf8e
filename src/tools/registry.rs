//! Tool registry for the tools available on a call.

use std::collections::HashMap;
use std::sync::Arc;

use crate::context::CallContext;
use crate::error::ToolError;
use crate::tools::builtin::SharedController;
use crate::tools::builtin::call::{ConfirmInformationTool, EndCallTool, SendConfirmationEmailTool};
use crate::tools::builtin::intake::{
    IntakeStatusTool, SetAddressTool, SetDateOfBirthTool, SetInsuranceTool, SetNameTool,
    SetReferralTool, TextFieldTool,
};
use crate::tools::builtin::scheduling::{SetAppointmentTool, SuggestProvidersTool};
use crate::tools::tool::{Tool, ToolDefinition, ToolDomain, ToolOutput};

/// The intake tools bound to one call's controller. Built once when the call
/// starts and read-only afterwards.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Register every intake tool against `controller`.
    pub fn for_call(controller: SharedController) -> Self {
        let c = controller;
        let tools: [Arc<dyn Tool>; 15] = [
            Arc::new(SetNameTool::new(c.clone())),
            Arc::new(SetDateOfBirthTool::new(c.clone())),
            Arc::new(SetInsuranceTool::new(c.clone())),
            Arc::new(SetReferralTool::new(c.clone())),
            Arc::new(TextFieldTool::referred_physician(c.clone())),
            Arc::new(TextFieldTool::chief_complaint(c.clone())),
            Arc::new(SetAddressTool::new(c.clone())),
            Arc::new(TextFieldTool::phone_number(c.clone())),
            Arc::new(TextFieldTool::email(c.clone())),
            Arc::new(SuggestProvidersTool::new(c.clone())),
            Arc::new(SetAppointmentTool::new(c.clone())),
            Arc::new(ConfirmInformationTool::new(c.clone())),
            Arc::new(SendConfirmationEmailTool::new(c.clone())),
            Arc::new(EndCallTool::new(c.clone())),
            Arc::new(IntakeStatusTool::new(c)),
        ];

        let tools: HashMap<String, Arc<dyn Tool>> = tools
            .into_iter()
            .map(|tool| (tool.name().to_string(), tool))
            .collect();
        tracing::debug!(count = tools.len(), "Registered intake tools");
        Self { tools }
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// List all tool names, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get the number of registered tools.
    pub fn count(&self) -> usize {
        self.tools.len()
    }

    /// Look up and run a tool by name.
    pub async fn execute(
        &self,
        name: &str,
        params: serde_json::Value,
        ctx: &CallContext,
    ) -> Result<ToolOutput, ToolError> {
        let tool = self.get(name).ok_or_else(|| ToolError::NotFound {
            name: name.to_string(),
        })?;
        tracing::debug!(call_id = %ctx.call_id, tool = name, "Executing tool");
        let output = tool.execute(params, ctx).await?;
        if output.is_rejected() {
            tracing::info!(
                call_id = %ctx.call_id,
                tool = name,
                reason = output.message().unwrap_or_default(),
                "Tool call rejected"
            );
        }
        Ok(output)
    }

    /// Get tool definitions for LLM function calling, sorted by name.
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.definitions_where(|_| true)
    }

    /// Get tool definitions filtered by domain, sorted by name.
    pub fn tool_definitions_for_domain(&self, domain: ToolDomain) -> Vec<ToolDefinition> {
        self.definitions_where(|tool| tool.domain() == domain)
    }

    fn definitions_where(&self, keep: impl Fn(&dyn Tool) -> bool) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self
            .tools
            .values()
            .map(|tool| tool.as_ref())
            .filter(|tool| keep(*tool))
            .map(|tool| definition(tool))
            .collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }
}

fn definition(tool: &dyn Tool) -> ToolDefinition {
    ToolDefinition {
        name: tool.name().to_string(),
        description: tool.description().to_string(),
        parameters: tool.parameters_schema(),
    }
}
