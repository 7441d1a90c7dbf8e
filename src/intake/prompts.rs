//! Per-turn system prompt built from the controller's missing/gathered state.

use crate::config::AgentConfig;

use super::controller::IntakeController;
use super::fields::gathered_in_order;

const INSTRUCTIONS: &str = "\
Guidelines:
- Be concise. Ask for ONE piece of information at a time.
- After every answer, call the matching tool and read its reply back so the patient can verify it.
- Dates of birth use YYYY-MM-DD. Appointment times use YYYY-MM-DD HH:MM.
- Once the reason for the visit is known, call suggest_providers and let the patient choose.
- When everything is collected, read all of it back and call confirm_information only after the patient agrees.
- If the patient gave an email, call send_confirmation_email after confirming.
- Call end_call when the patient is ready to hang up; it will tell you if anything is still outstanding.";

/// Render the system prompt for the next dialogue turn. Pure read.
pub fn intake_system_prompt(controller: &IntakeController, config: &AgentConfig) -> String {
    let record = controller.record();
    let mut parts = vec![config.persona.clone(), INSTRUCTIONS.to_string()];

    let gathered = gathered_in_order(record);
    if gathered.is_empty() {
        parts.push("# Gathered\nNothing yet. Start by greeting the patient and asking their name.".to_string());
    } else {
        let lines: Vec<String> = gathered
            .iter()
            .map(|(name, value)| format!("- **{}:** {}", label(name), value))
            .collect();
        parts.push(format!("# Gathered\n{}", lines.join("\n")));
    }

    let missing = controller.missing_fields();
    if !missing.is_empty() {
        let lines: Vec<String> = missing.iter().map(|name| format!("- {}", label(name))).collect();
        parts.push(format!("# Still needed\n{}", lines.join("\n")));
    }

    let outstanding = record.address_parts.outstanding();
    if record.address.is_some() && !outstanding.is_empty() {
        parts.push(format!(
            "The address is missing its {}. Ask for it before moving on.",
            outstanding.join(", ")
        ));
    }

    if record.email.is_none() {
        parts.push("An email address is optional. Offer to send a confirmation email if they share one.".to_string());
    }

    let status = if !record.information_confirmed() {
        "Information has NOT been confirmed by the patient."
    } else if record.email.is_some() && !record.confirmation_email_sent() {
        "Information confirmed. The confirmation email has NOT been sent yet."
    } else {
        "Information confirmed. You may wrap up the call."
    };
    parts.push(format!("# Status\n{status}"));

    parts.join("\n\n")
}

fn label(field: &str) -> &str {
    match field {
        "first_name" => "First name",
        "last_name" => "Last name",
        "date_of_birth" => "Date of birth",
        "insurance_payer" => "Insurance payer",
        "insurance_id" => "Insurance ID",
        "has_referral" => "Has referral",
        "referred_physician" => "Referring physician",
        "chief_complaint" => "Reason for visit",
        "address" => "Address",
        "phone_number" => "Phone number",
        "email" => "Email",
        "appointment_provider" => "Provider",
        "appointment_time" => "Appointment time",
        other => other,
    }
}
