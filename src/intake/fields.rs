//! Enumerated registry of intake fields.
//!
//! The registry is the single source of truth for which fields exist, their
//! order, whether they count toward completeness, and how their current value
//! is rendered. Missing/gathered computations walk it in order.

use std::collections::BTreeMap;

use super::format::{spoken_date, spoken_datetime};
use super::record::{PatientRecord, ReferralStatus};

/// One field of the intake form.
pub struct FieldDescriptor {
    pub name: &'static str,
    /// Whether the field must be set before the call can end.
    pub required: bool,
    /// When this returns true the field is not required for this record.
    pub excluded_when: Option<fn(&PatientRecord) -> bool>,
    /// Rendered value, `None` while unset.
    pub value: fn(&PatientRecord) -> Option<String>,
}

impl FieldDescriptor {
    /// Whether the field counts toward completeness for this record.
    pub fn is_required_for(&self, record: &PatientRecord) -> bool {
        self.required && !self.excluded_when.is_some_and(|excluded| excluded(record))
    }
}

fn referral_not_confirmed(record: &PatientRecord) -> bool {
    record.referral != ReferralStatus::HasReferral
}

/// Data fields in conversational order.
pub const FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor {
        name: "first_name",
        required: true,
        excluded_when: None,
        value: |r| r.first_name.clone(),
    },
    FieldDescriptor {
        name: "last_name",
        required: true,
        excluded_when: None,
        value: |r| r.last_name.clone(),
    },
    FieldDescriptor {
        name: "date_of_birth",
        required: true,
        excluded_when: None,
        value: |r| r.date_of_birth.as_ref().map(spoken_date),
    },
    FieldDescriptor {
        name: "insurance_payer",
        required: true,
        excluded_when: None,
        value: |r| r.insurance_payer.clone(),
    },
    FieldDescriptor {
        name: "insurance_id",
        required: true,
        excluded_when: None,
        value: |r| r.insurance_id.clone(),
    },
    FieldDescriptor {
        name: "has_referral",
        required: true,
        excluded_when: None,
        value: |r| r.referral.is_known().then(|| r.referral.to_string()),
    },
    FieldDescriptor {
        name: "referred_physician",
        required: true,
        excluded_when: Some(referral_not_confirmed),
        value: |r| r.referred_physician.clone(),
    },
    FieldDescriptor {
        name: "chief_complaint",
        required: true,
        excluded_when: None,
        value: |r| r.chief_complaint.clone(),
    },
    FieldDescriptor {
        name: "address",
        required: true,
        excluded_when: None,
        value: |r| r.address.clone(),
    },
    FieldDescriptor {
        name: "phone_number",
        required: true,
        excluded_when: None,
        value: |r| r.phone_number.clone(),
    },
    FieldDescriptor {
        name: "email",
        required: false,
        excluded_when: None,
        value: |r| r.email.clone(),
    },
    FieldDescriptor {
        name: "appointment_provider",
        required: true,
        excluded_when: None,
        value: |r| r.appointment_provider.clone(),
    },
    FieldDescriptor {
        name: "appointment_time",
        required: true,
        excluded_when: None,
        value: |r| r.appointment_time.as_ref().map(spoken_datetime),
    },
];

/// Process flags, reported in gathered output only once they are set.
pub const PROCESS_FLAGS: &[(&str, fn(&PatientRecord) -> bool)] = &[
    ("information_confirmed", PatientRecord::information_confirmed),
    ("confirmation_email_sent", PatientRecord::confirmation_email_sent),
];

/// Required fields that are still unset, in registry order.
pub fn missing(record: &PatientRecord) -> Vec<&'static str> {
    FIELDS
        .iter()
        .filter(|f| f.is_required_for(record) && (f.value)(record).is_none())
        .map(|f| f.name)
        .collect()
}

/// Every set field and raised process flag, keyed by name.
pub fn gathered(record: &PatientRecord) -> BTreeMap<&'static str, String> {
    let mut out: BTreeMap<&'static str, String> = FIELDS
        .iter()
        .filter_map(|f| (f.value)(record).map(|v| (f.name, v)))
        .collect();
    for &(name, flag) in PROCESS_FLAGS {
        if flag(record) {
            out.insert(name, "true".to_string());
        }
    }
    out
}

/// Set fields as (name, value) pairs in registry order, for prompt rendering.
pub fn gathered_in_order(record: &PatientRecord) -> Vec<(&'static str, String)> {
    FIELDS
        .iter()
        .filter_map(|f| (f.value)(record).map(|v| (f.name, v)))
        .collect()
}
