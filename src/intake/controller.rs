//! IntakeController: owns the call's patient record and gates the terminal
//! actions (confirmation email, hang-up) on completeness and confirmation.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::directory::ProviderDirectory;
use super::fields;
use super::format::{parse_date, parse_datetime, spoken_date, spoken_datetime};
use super::record::{AddressParts, PatientRecord, ReferralStatus};
use crate::context::CallContext;
use crate::error::IntakeError;
use crate::notify::Notifier;
use crate::session::CallSession;

/// Subject line of the confirmation email.
pub const CONFIRMATION_SUBJECT: &str = "Appointment Confirmation";

/// Why the call may not end yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HangupRefusal {
    /// Required fields still unset, in registry order.
    MissingFields(Vec<&'static str>),
    NotConfirmed,
    EmailNotSent,
}

/// Outcome of the termination gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HangupDecision {
    Refused(HangupRefusal),
    /// Hang-up granted. `teardown_ok` is informational: a failed teardown is
    /// logged but does not revoke the grant.
    Granted { teardown_ok: bool },
}

impl HangupDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted { .. })
    }

    /// Text relayed to the dialogue layer.
    pub fn message(&self) -> String {
        match self {
            Self::Refused(HangupRefusal::MissingFields(fields)) => format!(
                "Cannot end the call yet. Still missing: {}.",
                fields.join(", ")
            ),
            Self::Refused(HangupRefusal::NotConfirmed) => {
                "Cannot end the call yet. Please read the information back to the patient and have them confirm it.".to_string()
            }
            Self::Refused(HangupRefusal::EmailNotSent) => {
                "Cannot end the call yet. The confirmation email must be sent first.".to_string()
            }
            Self::Granted { .. } => "Thank you for calling. Goodbye!".to_string(),
        }
    }
}

/// Per-call intake state machine.
pub struct IntakeController {
    call_id: Uuid,
    session_id: String,
    started_at: DateTime<Utc>,
    record: PatientRecord,
    directory: Arc<ProviderDirectory>,
    notifier: Arc<dyn Notifier>,
    session: Arc<dyn CallSession>,
}

impl IntakeController {
    pub fn new(
        ctx: &CallContext,
        directory: Arc<ProviderDirectory>,
        notifier: Arc<dyn Notifier>,
        session: Arc<dyn CallSession>,
    ) -> Self {
        tracing::info!(call_id = %ctx.call_id, session_id = %ctx.session_id, "Intake started");
        Self {
            call_id: ctx.call_id,
            session_id: ctx.session_id.clone(),
            started_at: ctx.started_at,
            record: PatientRecord::new(),
            directory,
            notifier,
            session,
        }
    }

    pub fn call_id(&self) -> Uuid {
        self.call_id
    }

    pub fn record(&self) -> &PatientRecord {
        &self.record
    }

    fn log_set(&self, field: &'static str) {
        tracing::debug!(call_id = %self.call_id, field, "Field recorded");
    }

    // ── Setters ─────────────────────────────────────────────────────

    pub fn set_name(&mut self, first_name: &str, last_name: &str) -> Result<String, IntakeError> {
        let first = required_text("first name", first_name)?;
        let last = required_text("last name", last_name)?;
        let reply = format!("I have your name as {first} {last}. Is that correct?");
        self.record.first_name = Some(first);
        self.record.last_name = Some(last);
        self.log_set("name");
        Ok(reply)
    }

    pub fn set_date_of_birth(&mut self, date_of_birth: &str) -> Result<String, IntakeError> {
        let dob = parse_date("date of birth", date_of_birth).inspect_err(|e| {
            tracing::info!(call_id = %self.call_id, error = %e, "Rejected date of birth");
        })?;
        self.record.date_of_birth = Some(dob);
        self.log_set("date_of_birth");
        Ok(format!(
            "I have your date of birth as {}. Is that correct?",
            spoken_date(&dob)
        ))
    }

    pub fn set_insurance(&mut self, payer: &str, insurance_id: &str) -> Result<String, IntakeError> {
        let payer = required_text("insurance payer", payer)?;
        let id = required_text("insurance ID", insurance_id)?;
        let reply = format!("I have your insurance as {payer} with ID {id}. Is that correct?");
        self.record.insurance_payer = Some(payer);
        self.record.insurance_id = Some(id);
        self.log_set("insurance");
        Ok(reply)
    }

    pub fn set_referral(&mut self, has_referral: bool) -> String {
        self.record.referral = ReferralStatus::from_bool(has_referral);
        self.log_set("has_referral");
        if has_referral {
            "Noted that you have a referral. Which physician referred you?".to_string()
        } else {
            "Noted that you do not have a referral.".to_string()
        }
    }

    pub fn set_referred_physician(&mut self, physician: &str) -> Result<String, IntakeError> {
        let physician = required_text("referring physician", physician)?;
        let reply = format!("I have your referring physician as {physician}. Is that correct?");
        self.record.referred_physician = Some(physician);
        self.log_set("referred_physician");
        Ok(reply)
    }

    pub fn set_chief_complaint(&mut self, complaint: &str) -> Result<String, IntakeError> {
        let complaint = required_text("reason for your visit", complaint)?;
        let reply = format!("I have the reason for your visit as: {complaint}. Is that correct?");
        self.record.chief_complaint = Some(complaint);
        self.log_set("chief_complaint");
        Ok(reply)
    }

    /// Record address components. Parts are kept across calls, but the composed
    /// address only exists once a street is known; the reply names any of
    /// city, state, or postal code still absent.
    pub fn set_address(&mut self, parts: AddressParts) -> Result<String, IntakeError> {
        let parts = AddressParts {
            street: non_empty(parts.street),
            city: non_empty(parts.city),
            state: non_empty(parts.state),
            postal_code: non_empty(parts.postal_code),
        };

        self.record.address_parts.merge(parts);
        let Some(composed) = self.record.address_parts.compose() else {
            return Err(IntakeError::IncompleteAddress);
        };

        self.record.address = Some(composed.clone());
        self.log_set("address");

        let outstanding = self.record.address_parts.outstanding();
        if outstanding.is_empty() {
            Ok(format!("I have your address as {composed}. Is that correct?"))
        } else {
            Ok(format!(
                "I have your address as {composed}. I still need your {}.",
                outstanding.join(", ")
            ))
        }
    }

    pub fn set_phone_number(&mut self, phone: &str) -> Result<String, IntakeError> {
        let phone = required_text("phone number", phone)?;
        let reply = format!("I have your phone number as {phone}. Is that correct?");
        self.record.phone_number = Some(phone);
        self.log_set("phone_number");
        Ok(reply)
    }

    pub fn set_email(&mut self, email: &str) -> Result<String, IntakeError> {
        let email = required_text("email address", email)?;
        let reply = format!("I have your email as {email}. Is that correct?");
        self.record.email = Some(email);
        self.log_set("email");
        Ok(reply)
    }

    /// Record the chosen provider and slot. The provider is committed even when
    /// the timestamp fails to parse. A provider found in the directory is stored
    /// under its listed name; unlisted providers and slots are accepted as given.
    pub fn set_appointment(&mut self, provider: &str, time: &str) -> Result<String, IntakeError> {
        let provider = required_text("provider", provider)?;
        let provider = match self.directory.find(&provider) {
            Some(listed) => listed.name.clone(),
            None => provider,
        };
        self.record.appointment_provider = Some(provider.clone());
        self.log_set("appointment_provider");

        let when = parse_datetime("appointment time", time).inspect_err(|e| {
            tracing::info!(call_id = %self.call_id, error = %e, "Rejected appointment time");
        })?;
        self.record.appointment_time = Some(when);
        self.log_set("appointment_time");
        Ok(format!(
            "I have your appointment with {provider} on {}. Is that correct?",
            spoken_datetime(&when)
        ))
    }

    // ── Queries ─────────────────────────────────────────────────────

    pub fn missing_fields(&self) -> Vec<&'static str> {
        fields::missing(&self.record)
    }

    pub fn gathered_fields(&self) -> BTreeMap<&'static str, String> {
        fields::gathered(&self.record)
    }

    pub fn suggest_providers(&self) -> Result<String, IntakeError> {
        self.directory
            .suggest(self.record.chief_complaint.as_deref())
    }

    // ── Confirmation, email, hang-up ───────────────────────────────

    /// One-way latch; later calls report that confirmation already happened.
    pub fn confirm_information(&mut self) -> String {
        if self.record.information_confirmed {
            return "The information was already confirmed.".to_string();
        }
        self.record.information_confirmed = true;
        tracing::info!(call_id = %self.call_id, "Information confirmed");
        "Thank you, your information is confirmed.".to_string()
    }

    /// Subject and body of the confirmation email.
    pub fn confirmation_email(&self) -> (String, String) {
        let name = self
            .record
            .full_name()
            .unwrap_or_else(|| "Patient".to_string());
        let provider = self
            .record
            .appointment_provider
            .as_deref()
            .unwrap_or("to be determined");
        let when = self
            .record
            .appointment_time
            .as_ref()
            .map(spoken_datetime)
            .unwrap_or_else(|| "to be determined".to_string());

        let body = format!(
            "Dear {name},\n\n\
             Your appointment has been scheduled.\n\n\
             Provider: {provider}\n\
             Date and time: {when}\n\n\
             If you need to reschedule, please call the clinic.\n"
        );
        (CONFIRMATION_SUBJECT.to_string(), body)
    }

    /// Deliver the confirmation email. Requires an email address, then a
    /// confirmed record. Every call re-attempts delivery.
    pub async fn send_confirmation_email(&mut self) -> Result<String, IntakeError> {
        let Some(recipient) = self.record.email.clone() else {
            return Err(IntakeError::NoRecipient);
        };
        if !self.record.information_confirmed {
            return Err(IntakeError::NotConfirmed);
        }

        let (subject, body) = self.confirmation_email();
        if self.notifier.send(&recipient, &subject, &body).await {
            self.record.confirmation_email_sent = true;
            tracing::info!(call_id = %self.call_id, "Confirmation email sent");
            Ok(format!("A confirmation email has been sent to {recipient}."))
        } else {
            tracing::warn!(call_id = %self.call_id, "Confirmation email delivery failed");
            Err(IntakeError::Delivery(format!(
                "the message to {recipient} could not be delivered"
            )))
        }
    }

    /// Evaluate the termination gate: completeness, then confirmation, then
    /// the email branch. Tears down the session when granted.
    pub async fn end_call(&self) -> HangupDecision {
        if let Err(refusal) = self.termination_check() {
            tracing::info!(call_id = %self.call_id, ?refusal, "Hang-up refused");
            return HangupDecision::Refused(refusal);
        }

        let teardown_ok = self.session.teardown(&self.session_id).await;
        tracing::info!(
            call_id = %self.call_id,
            duration_secs = (Utc::now() - self.started_at).num_seconds(),
            "Hang-up granted"
        );
        if !teardown_ok {
            tracing::warn!(
                call_id = %self.call_id,
                session_id = %self.session_id,
                "Teardown failed; hang-up still granted"
            );
        }
        HangupDecision::Granted { teardown_ok }
    }

    fn termination_check(&self) -> Result<(), HangupRefusal> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(HangupRefusal::MissingFields(missing));
        }
        if !self.record.information_confirmed {
            return Err(HangupRefusal::NotConfirmed);
        }
        if self.record.email.is_some() && !self.record.confirmation_email_sent {
            return Err(HangupRefusal::EmailNotSent);
        }
        Ok(())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trimmed text, or `Blank` when nothing is left.
fn required_text(field: &'static str, value: &str) -> Result<String, IntakeError> {
    non_empty(Some(value.to_string())).ok_or(IntakeError::Blank { field })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Records every send; succeeds unless told otherwise.
    pub struct RecordingNotifier {
        pub sent: Mutex<Vec<(String, String, String)>>,
        pub succeed: AtomicBool,
    }

    impl RecordingNotifier {
        pub fn new(succeed: bool) -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
                succeed: AtomicBool::new(succeed),
            })
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, recipient: &str, subject: &str, body: &str) -> bool {
            self.sent.lock().unwrap().push((
                recipient.to_string(),
                subject.to_string(),
                body.to_string(),
            ));
            self.succeed.load(Ordering::SeqCst)
        }
    }

    pub struct RecordingSession {
        pub torn_down: Mutex<Vec<String>>,
        pub succeed: bool,
    }

    impl RecordingSession {
        pub fn new(succeed: bool) -> Arc<Self> {
            Arc::new(Self {
                torn_down: Mutex::new(Vec::new()),
                succeed,
            })
        }
    }

    #[async_trait]
    impl CallSession for RecordingSession {
        async fn teardown(&self, session_id: &str) -> bool {
            self.torn_down.lock().unwrap().push(session_id.to_string());
            self.succeed
        }
    }

    fn controller_with(
        notifier: Arc<RecordingNotifier>,
        session: Arc<RecordingSession>,
    ) -> IntakeController {
        IntakeController::new(
            &CallContext::new("room-1"),
            Arc::new(ProviderDirectory::sample()),
            notifier,
            session,
        )
    }

    fn controller() -> IntakeController {
        controller_with(RecordingNotifier::new(true), RecordingSession::new(true))
    }

    fn fill_required(c: &mut IntakeController) {
        c.set_name("Jane", "Doe").unwrap();
        c.set_date_of_birth("1990-04-17").unwrap();
        c.set_insurance("Aetna", "AET-12345").unwrap();
        c.set_referral(false);
        c.set_chief_complaint("chest pain and shortness of breath").unwrap();
        c.set_address(AddressParts {
            street: Some("123 Main St".into()),
            city: Some("Springfield".into()),
            state: Some("IL".into()),
            postal_code: Some("62704".into()),
        })
        .unwrap();
        c.set_phone_number("555-0100").unwrap();
        c.set_appointment("Dr. Emily Carter", "2023-05-01 10:00").unwrap();
    }

    type Setter = fn(&mut IntakeController) -> Result<String, IntakeError>;

    #[test]
    fn each_setter_moves_its_fields_from_missing_to_gathered() {
        let cases: &[(Setter, &[(&str, &str)])] = &[
            (
                |c| c.set_name(" Jane ", "Doe"),
                &[("first_name", "Jane"), ("last_name", "Doe")],
            ),
            (
                |c| c.set_date_of_birth("1990-04-17"),
                &[("date_of_birth", "April 17, 1990")],
            ),
            (
                |c| c.set_insurance("Aetna", "AET-12345"),
                &[("insurance_payer", "Aetna"), ("insurance_id", "AET-12345")],
            ),
            (|c| Ok(c.set_referral(false)), &[("has_referral", "no")]),
            (|c| Ok(c.set_referral(true)), &[("has_referral", "yes")]),
            (
                |c| {
                    c.set_referral(true);
                    c.set_referred_physician("Dr. Gregory House")
                },
                &[("referred_physician", "Dr. Gregory House")],
            ),
            (
                |c| c.set_chief_complaint("persistent cough"),
                &[("chief_complaint", "persistent cough")],
            ),
            (
                |c| {
                    c.set_address(AddressParts {
                        street: Some("123 Main St".into()),
                        city: Some("Springfield".into()),
                        state: Some("IL".into()),
                        postal_code: Some("62704".into()),
                    })
                },
                &[("address", "123 Main St, Springfield, IL 62704")],
            ),
            (
                |c| c.set_phone_number(" 555-0100 "),
                &[("phone_number", "555-0100")],
            ),
            (
                |c| c.set_appointment("Dr. Emily Carter", "2023-05-01 10:00"),
                &[
                    ("appointment_provider", "Dr. Emily Carter"),
                    ("appointment_time", "Monday, May 1, 2023 at 10:00 AM"),
                ],
            ),
        ];

        for (set, expected) in cases {
            let mut c = controller();
            set(&mut c).unwrap();
            let missing = c.missing_fields();
            let gathered = c.gathered_fields();
            for (field, value) in *expected {
                assert!(!missing.contains(field), "{field} still missing");
                assert_eq!(gathered[field], *value, "gathered value of {field}");
            }
        }
    }

    #[test]
    fn email_is_gathered_but_never_missing() {
        let mut c = controller();
        assert!(!c.missing_fields().contains(&"email"));
        c.set_email("jane@example.com").unwrap();
        assert_eq!(c.gathered_fields()["email"], "jane@example.com");
    }

    #[test]
    fn blank_values_are_rejected_and_stay_missing() {
        let cases: &[(Setter, &str)] = &[
            (|c| c.set_name("", "Doe"), "first_name"),
            (|c| c.set_name("Jane", "  "), "last_name"),
            (|c| c.set_insurance(" ", "AET-1"), "insurance_payer"),
            (|c| c.set_insurance("Aetna", ""), "insurance_id"),
            (
                |c| {
                    c.set_referral(true);
                    c.set_referred_physician("\t")
                },
                "referred_physician",
            ),
            (|c| c.set_chief_complaint("   "), "chief_complaint"),
            (|c| c.set_phone_number(""), "phone_number"),
            (
                |c| c.set_appointment(" ", "2023-05-01 10:00"),
                "appointment_provider",
            ),
        ];

        for (set, field) in cases {
            let mut c = controller();
            let err = set(&mut c).unwrap_err();
            assert!(matches!(err, IntakeError::Blank { .. }), "{field}: {err:?}");
            assert!(c.missing_fields().contains(field), "{field} left missing");
            assert!(!c.gathered_fields().contains_key(field));
        }
    }

    #[test]
    fn blank_name_keeps_previous_value() {
        let mut c = controller();
        c.set_name("Jane", "Doe").unwrap();
        assert!(c.set_name("", "Smith").is_err());
        assert_eq!(c.record().full_name().as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn blank_email_is_not_recorded() {
        let mut c = controller();
        assert!(c.set_email("  ").is_err());
        assert!(c.record().email.is_none());
    }

    #[tokio::test]
    async fn blank_entries_cannot_satisfy_the_hangup_gate() {
        let session = RecordingSession::new(true);
        let mut c = controller_with(RecordingNotifier::new(true), session.clone());
        let _ = c.set_name("", "");
        let _ = c.set_insurance(" ", " ");
        let _ = c.set_chief_complaint("   ");
        let _ = c.set_phone_number("");
        let _ = c.set_appointment("", "2023-05-01 10:00");
        c.confirm_information();

        assert_eq!(c.suggest_providers().unwrap_err(), IntakeError::MissingComplaint);
        let decision = c.end_call().await;
        assert!(matches!(
            decision,
            HangupDecision::Refused(HangupRefusal::MissingFields(ref f))
                if f.contains(&"chief_complaint") && f.contains(&"appointment_provider")
        ));
        assert!(session.torn_down.lock().unwrap().is_empty());
    }

    #[test]
    fn setters_overwrite_previous_values() {
        let mut c = controller();
        c.set_chief_complaint("headache").unwrap();
        c.set_chief_complaint("migraine").unwrap();
        assert_eq!(c.record().chief_complaint.as_deref(), Some("migraine"));
    }

    #[test]
    fn invalid_date_of_birth_leaves_record_unchanged() {
        let mut c = controller();
        c.set_date_of_birth("1990-04-17").unwrap();
        let err = c.set_date_of_birth("17/04/1990").unwrap_err();
        assert!(matches!(err, IntakeError::Validation { .. }));
        assert_eq!(c.gathered_fields()["date_of_birth"], "April 17, 1990");
    }

    #[test]
    fn referral_controls_physician_requirement() {
        let mut c = controller();
        c.set_referral(false);
        assert!(!c.missing_fields().contains(&"referred_physician"));
        c.set_referral(true);
        assert!(c.missing_fields().contains(&"referred_physician"));
        c.set_referred_physician("Dr. Gregory House").unwrap();
        assert!(!c.missing_fields().contains(&"referred_physician"));
    }

    #[test]
    fn partial_address_records_street_and_reports_outstanding() {
        let mut c = controller();
        let reply = c
            .set_address(AddressParts {
                street: Some("123 Main St".into()),
                city: Some("Springfield".into()),
                ..Default::default()
            })
            .unwrap();
        assert!(reply.contains("state, postal code"));
        assert_eq!(c.record().address.as_deref(), Some("123 Main St, Springfield"));
        assert!(!c.missing_fields().contains(&"address"));

        let reply = c
            .set_address(AddressParts {
                state: Some("IL".into()),
                postal_code: Some("62704".into()),
                ..Default::default()
            })
            .unwrap();
        assert!(reply.ends_with("Is that correct?"));
        assert_eq!(
            c.record().address.as_deref(),
            Some("123 Main St, Springfield, IL 62704")
        );
    }

    #[test]
    fn address_without_street_is_rejected() {
        let mut c = controller();
        let err = c
            .set_address(AddressParts {
                city: Some("Springfield".into()),
                street: Some("   ".into()),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err, IntakeError::IncompleteAddress);
        assert!(c.record().address.is_none());
        assert!(c.missing_fields().contains(&"address"));

        // The city given earlier is kept once the street arrives.
        c.set_address(AddressParts {
            street: Some("123 Main St".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(c.record().address.as_deref(), Some("123 Main St, Springfield"));
    }

    #[test]
    fn invalid_appointment_time_still_commits_provider() {
        let mut c = controller();
        let err = c
            .set_appointment("Dr. Emily Carter", "2023-13-40 25:00")
            .unwrap_err();
        assert!(matches!(err, IntakeError::Validation { field: "appointment time", .. }));
        assert_eq!(c.record().appointment_provider.as_deref(), Some("Dr. Emily Carter"));
        assert!(c.record().appointment_time.is_none());
        assert!(c.missing_fields().contains(&"appointment_time"));
    }

    #[test]
    fn appointment_uses_listed_provider_name() {
        let mut c = controller();
        let reply = c.set_appointment("dr. emily carter", "2023-05-01 10:00").unwrap();
        assert!(reply.contains("Dr. Emily Carter"));
        assert_eq!(c.record().appointment_provider.as_deref(), Some("Dr. Emily Carter"));
    }

    #[test]
    fn appointment_accepts_unlisted_provider() {
        let mut c = controller();
        let reply = c.set_appointment("Dr. Not Listed", "2030-01-07 08:15").unwrap();
        assert!(reply.contains("Monday, January 7, 2030 at 8:15 AM"));
    }

    #[test]
    fn confirm_is_a_one_way_latch() {
        let mut c = controller();
        let first = c.confirm_information();
        assert!(c.record().information_confirmed());
        let second = c.confirm_information();
        assert!(c.record().information_confirmed());
        assert_ne!(first, second);
        assert!(second.contains("already"));
    }

    #[tokio::test]
    async fn email_requires_recipient_before_confirmation() {
        let notifier = RecordingNotifier::new(true);
        let mut c = controller_with(notifier.clone(), RecordingSession::new(true));
        assert_eq!(
            c.send_confirmation_email().await.unwrap_err(),
            IntakeError::NoRecipient
        );
        c.set_email("jane@example.com").unwrap();
        assert_eq!(
            c.send_confirmation_email().await.unwrap_err(),
            IntakeError::NotConfirmed
        );
        assert!(!c.record().confirmation_email_sent());
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn email_body_names_patient_provider_and_time() {
        let notifier = RecordingNotifier::new(true);
        let mut c = controller_with(notifier.clone(), RecordingSession::new(true));
        fill_required(&mut c);
        c.set_email("jane@example.com").unwrap();
        c.confirm_information();

        c.send_confirmation_email().await.unwrap();
        assert!(c.record().confirmation_email_sent());

        let sent = notifier.sent.lock().unwrap();
        let (to, subject, body) = &sent[0];
        assert_eq!(to, "jane@example.com");
        assert_eq!(subject, CONFIRMATION_SUBJECT);
        assert!(body.contains("Jane Doe"));
        assert!(body.contains("Dr. Emily Carter"));
        assert!(body.contains("Monday, May 1, 2023 at 10:00 AM"));
    }

    #[tokio::test]
    async fn failed_delivery_leaves_flag_false_and_can_retry() {
        let notifier = RecordingNotifier::new(false);
        let mut c = controller_with(notifier.clone(), RecordingSession::new(true));
        c.set_email("jane@example.com").unwrap();
        c.confirm_information();

        let err = c.send_confirmation_email().await.unwrap_err();
        assert!(matches!(err, IntakeError::Delivery(_)));
        assert!(!c.record().confirmation_email_sent());

        notifier.succeed.store(true, Ordering::SeqCst);
        c.send_confirmation_email().await.unwrap();
        assert!(c.record().confirmation_email_sent());

        // No dedup: a further call sends again.
        c.send_confirmation_email().await.unwrap();
        assert_eq!(notifier.sent.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn hangup_refused_while_fields_missing() {
        let session = RecordingSession::new(true);
        let c = controller_with(RecordingNotifier::new(true), session.clone());
        let decision = c.end_call().await;
        assert!(matches!(
            decision,
            HangupDecision::Refused(HangupRefusal::MissingFields(ref f)) if f.contains(&"first_name")
        ));
        assert!(session.torn_down.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn confirmation_outranks_email_in_hangup() {
        let session = RecordingSession::new(true);
        let mut c = controller_with(RecordingNotifier::new(true), session.clone());
        fill_required(&mut c);
        c.set_email("jane@example.com").unwrap();

        let decision = c.end_call().await;
        assert_eq!(decision, HangupDecision::Refused(HangupRefusal::NotConfirmed));
        assert!(decision.message().contains("confirm"));

        c.confirm_information();
        assert_eq!(
            c.end_call().await,
            HangupDecision::Refused(HangupRefusal::EmailNotSent)
        );

        c.send_confirmation_email().await.unwrap();
        assert_eq!(c.end_call().await, HangupDecision::Granted { teardown_ok: true });
        assert_eq!(*session.torn_down.lock().unwrap(), vec!["room-1".to_string()]);
    }

    #[tokio::test]
    async fn hangup_without_email_is_granted_once_confirmed() {
        let session = RecordingSession::new(true);
        let mut c = controller_with(RecordingNotifier::new(true), session.clone());
        fill_required(&mut c);
        c.confirm_information();

        let decision = c.end_call().await;
        assert!(decision.is_granted());
        assert_eq!(session.torn_down.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn teardown_failure_does_not_revoke_grant() {
        let session = RecordingSession::new(false);
        let mut c = controller_with(RecordingNotifier::new(true), session.clone());
        fill_required(&mut c);
        c.confirm_information();

        assert_eq!(c.end_call().await, HangupDecision::Granted { teardown_ok: false });
    }

    #[test]
    fn suggest_requires_complaint() {
        let mut c = controller();
        assert_eq!(c.suggest_providers().unwrap_err(), IntakeError::MissingComplaint);
        c.set_chief_complaint("follow-up for my cardiology results").unwrap();
        let text = c.suggest_providers().unwrap();
        assert!(text.contains("Dr. Michael Chen"));
        assert!(!text.contains("Dr. Emily Carter"));
    }
}
