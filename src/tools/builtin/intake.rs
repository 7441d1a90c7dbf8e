//! Patient-record tools: field setters and the status snapshot.

use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::context::CallContext;
use crate::error::{IntakeError, ToolError};
use crate::intake::{AddressParts, IntakeController};
use crate::tools::tool::{Tool, ToolOutput, optional_str, require_bool, require_str};

use super::SharedController;

/// Turn a controller result into tool output. Intake failures are relayed,
/// not raised.
pub(crate) fn relay(result: Result<String, IntakeError>, elapsed: Duration) -> ToolOutput {
    match result {
        Ok(message) => ToolOutput::text(message, elapsed),
        Err(e) => ToolOutput::rejected(e.to_string(), elapsed),
    }
}

// ── single-value text fields ────────────────────────────────────────

/// Setter for a field carried by one free-text parameter.
pub struct TextFieldTool {
    name: &'static str,
    description: &'static str,
    param: &'static str,
    param_description: &'static str,
    apply: fn(&mut IntakeController, &str) -> Result<String, IntakeError>,
    controller: SharedController,
}

impl TextFieldTool {
    pub fn chief_complaint(controller: SharedController) -> Self {
        Self {
            name: "set_chief_complaint",
            description: "Record the patient's main reason for the visit, in their own words.",
            param: "complaint",
            param_description: "Reason for the visit",
            apply: IntakeController::set_chief_complaint,
            controller,
        }
    }

    pub fn referred_physician(controller: SharedController) -> Self {
        Self {
            name: "set_referred_physician",
            description: "Record the name of the physician who referred the patient. \
                          Only needed when the patient has a referral.",
            param: "physician",
            param_description: "Referring physician's name",
            apply: IntakeController::set_referred_physician,
            controller,
        }
    }

    pub fn phone_number(controller: SharedController) -> Self {
        Self {
            name: "set_phone_number",
            description: "Record the patient's contact phone number.",
            param: "phone_number",
            param_description: "Phone number, digits as spoken",
            apply: IntakeController::set_phone_number,
            controller,
        }
    }

    pub fn email(controller: SharedController) -> Self {
        Self {
            name: "set_email",
            description: "Record the patient's email address (optional). \
                          Used only for the confirmation email.",
            param: "email",
            param_description: "Email address",
            apply: IntakeController::set_email,
            controller,
        }
    }
}

#[async_trait]
impl Tool for TextFieldTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.description
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                self.param: { "type": "string", "description": self.param_description }
            },
            "required": [self.param]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _ctx: &CallContext,
    ) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let value = require_str(&params, self.param)?;
        let mut controller = self.controller.lock().await;
        let result = (self.apply)(&mut *controller, value);
        Ok(relay(result, start.elapsed()))
    }
}

// ── set_name ────────────────────────────────────────────────────────

pub struct SetNameTool {
    controller: SharedController,
}

impl SetNameTool {
    pub fn new(controller: SharedController) -> Self {
        Self { controller }
    }
}

#[async_trait]
impl Tool for SetNameTool {
    fn name(&self) -> &str {
        "set_name"
    }

    fn description(&self) -> &str {
        "Record the patient's first and last name."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "first_name": { "type": "string", "description": "Given name" },
                "last_name": { "type": "string", "description": "Family name" }
            },
            "required": ["first_name", "last_name"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _ctx: &CallContext,
    ) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let first = require_str(&params, "first_name")?;
        let last = require_str(&params, "last_name")?;
        let result = self.controller.lock().await.set_name(first, last);
        Ok(relay(result, start.elapsed()))
    }
}

// ── set_date_of_birth ───────────────────────────────────────────────

pub struct SetDateOfBirthTool {
    controller: SharedController,
}

impl SetDateOfBirthTool {
    pub fn new(controller: SharedController) -> Self {
        Self { controller }
    }
}

#[async_trait]
impl Tool for SetDateOfBirthTool {
    fn name(&self) -> &str {
        "set_date_of_birth"
    }

    fn description(&self) -> &str {
        "Record the patient's date of birth. Convert what the patient says to YYYY-MM-DD."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "date_of_birth": { "type": "string", "description": "Date in YYYY-MM-DD format" }
            },
            "required": ["date_of_birth"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _ctx: &CallContext,
    ) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let dob = require_str(&params, "date_of_birth")?;
        let result = self.controller.lock().await.set_date_of_birth(dob);
        Ok(relay(result, start.elapsed()))
    }
}

// ── set_insurance ───────────────────────────────────────────────────

pub struct SetInsuranceTool {
    controller: SharedController,
}

impl SetInsuranceTool {
    pub fn new(controller: SharedController) -> Self {
        Self { controller }
    }
}

#[async_trait]
impl Tool for SetInsuranceTool {
    fn name(&self) -> &str {
        "set_insurance"
    }

    fn description(&self) -> &str {
        "Record the patient's insurance payer and member ID."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "payer": { "type": "string", "description": "Insurance company name" },
                "insurance_id": { "type": "string", "description": "Member or policy ID" }
            },
            "required": ["payer", "insurance_id"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _ctx: &CallContext,
    ) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let payer = require_str(&params, "payer")?;
        let id = require_str(&params, "insurance_id")?;
        let result = self.controller.lock().await.set_insurance(payer, id);
        Ok(relay(result, start.elapsed()))
    }
}

// ── set_referral ────────────────────────────────────────────────────

pub struct SetReferralTool {
    controller: SharedController,
}

impl SetReferralTool {
    pub fn new(controller: SharedController) -> Self {
        Self { controller }
    }
}

#[async_trait]
impl Tool for SetReferralTool {
    fn name(&self) -> &str {
        "set_referral"
    }

    fn description(&self) -> &str {
        "Record whether the patient was referred by another physician."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "has_referral": { "type": "boolean", "description": "True if the patient has a referral" }
            },
            "required": ["has_referral"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _ctx: &CallContext,
    ) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let has_referral = require_bool(&params, "has_referral")?;
        let message = self.controller.lock().await.set_referral(has_referral);
        Ok(ToolOutput::text(message, start.elapsed()))
    }
}

// ── set_address ─────────────────────────────────────────────────────

pub struct SetAddressTool {
    controller: SharedController,
}

impl SetAddressTool {
    pub fn new(controller: SharedController) -> Self {
        Self { controller }
    }
}

#[async_trait]
impl Tool for SetAddressTool {
    fn name(&self) -> &str {
        "set_address"
    }

    fn description(&self) -> &str {
        "Record the patient's home address. Parts may be given across several calls; \
         only the parts supplied are updated. The reply says which parts are still needed."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "street": { "type": "string", "description": "Street address" },
                "city": { "type": "string", "description": "City" },
                "state": { "type": "string", "description": "State" },
                "postal_code": { "type": "string", "description": "ZIP or postal code" }
            }
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _ctx: &CallContext,
    ) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let parts = AddressParts {
            street: optional_str(&params, "street"),
            city: optional_str(&params, "city"),
            state: optional_str(&params, "state"),
            postal_code: optional_str(&params, "postal_code"),
        };
        let result = self.controller.lock().await.set_address(parts);
        Ok(relay(result, start.elapsed()))
    }
}

// ── get_intake_status ───────────────────────────────────────────────

/// Read-only snapshot of what is gathered and what is still missing.
pub struct IntakeStatusTool {
    controller: SharedController,
}

impl IntakeStatusTool {
    pub fn new(controller: SharedController) -> Self {
        Self { controller }
    }
}

#[async_trait]
impl Tool for IntakeStatusTool {
    fn name(&self) -> &str {
        "get_intake_status"
    }

    fn description(&self) -> &str {
        "List the information gathered so far and the fields still missing."
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
        let controller = self.controller.lock().await;
        let output = serde_json::json!({
            "status": "ok",
            "missing": controller.missing_fields(),
            "gathered": controller.gathered_fields(),
        });
        Ok(ToolOutput::success(output, start.elapsed()))
    }
}
