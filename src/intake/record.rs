//! Patient record collected during a single call.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Whether the patient was referred by another physician.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferralStatus {
    /// Not asked yet.
    #[default]
    Unknown,
    HasReferral,
    NoReferral,
}

impl ReferralStatus {
    pub fn from_bool(has_referral: bool) -> Self {
        if has_referral {
            Self::HasReferral
        } else {
            Self::NoReferral
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl std::fmt::Display for ReferralStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unknown => "unknown",
            Self::HasReferral => "yes",
            Self::NoReferral => "no",
        };
        write!(f, "{s}")
    }
}

/// Address components as they arrive, possibly across several calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressParts {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
}

impl AddressParts {
    /// Overlay newly supplied components; absent ones keep their prior value.
    pub fn merge(&mut self, other: AddressParts) {
        if other.street.is_some() {
            self.street = other.street;
        }
        if other.city.is_some() {
            self.city = other.city;
        }
        if other.state.is_some() {
            self.state = other.state;
        }
        if other.postal_code.is_some() {
            self.postal_code = other.postal_code;
        }
    }

    /// Names of the optional components that are still absent.
    pub fn outstanding(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.city.is_none() {
            missing.push("city");
        }
        if self.state.is_none() {
            missing.push("state");
        }
        if self.postal_code.is_none() {
            missing.push("postal code");
        }
        missing
    }

    /// "123 Main St, Springfield, IL 62704". `None` until a street is present.
    pub fn compose(&self) -> Option<String> {
        let street = self.street.as_deref()?;
        let mut parts = vec![street.to_string()];
        if let Some(ref city) = self.city {
            parts.push(city.clone());
        }
        let region = [self.state.as_deref(), self.postal_code.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        if !region.is_empty() {
            parts.push(region);
        }
        Some(parts.join(", "))
    }
}

/// The slot-filled intake form. One instance per call, discarded at hang-up.
///
/// Fields are only written through `IntakeController`; the process flags in
/// particular have no public setters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatientRecord {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    /// Composed from `address_parts` once a street is known.
    pub address: Option<String>,
    pub address_parts: AddressParts,
    pub insurance_payer: Option<String>,
    pub insurance_id: Option<String>,
    pub referral: ReferralStatus,
    pub referred_physician: Option<String>,
    pub chief_complaint: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub appointment_provider: Option<String>,
    pub appointment_time: Option<NaiveDateTime>,
    pub(crate) confirmation_email_sent: bool,
    pub(crate) information_confirmed: bool,
}

impl PatientRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn confirmation_email_sent(&self) -> bool {
        self.confirmation_email_sent
    }

    pub fn information_confirmed(&self) -> bool {
        self.information_confirmed
    }

    /// "Jane Doe", or whichever half is known.
    pub fn full_name(&self) -> Option<String> {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            (Some(only), None) | (None, Some(only)) => Some(only.to_string()),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_is_empty() {
        let record = PatientRecord::new();
        assert!(record.first_name.is_none());
        assert!(record.address.is_none());
        assert_eq!(record.referral, ReferralStatus::Unknown);
        assert!(!record.confirmation_email_sent());
        assert!(!record.information_confirmed());
    }

    #[test]
    fn compose_requires_street() {
        let parts = AddressParts {
            city: Some("Springfield".into()),
            ..Default::default()
        };
        assert!(parts.compose().is_none());
    }

    #[test]
    fn compose_full_and_partial_addresses() {
        let full = AddressParts {
            street: Some("123 Main St".into()),
            city: Some("Springfield".into()),
            state: Some("IL".into()),
            postal_code: Some("62704".into()),
        };
        assert_eq!(full.compose().unwrap(), "123 Main St, Springfield, IL 62704");
        assert!(full.outstanding().is_empty());

        let partial = AddressParts {
            street: Some("123 Main St".into()),
            state: Some("IL".into()),
            ..Default::default()
        };
        assert_eq!(partial.compose().unwrap(), "123 Main St, IL");
        assert_eq!(partial.outstanding(), vec!["city", "postal code"]);
    }

    #[test]
    fn merge_keeps_earlier_components() {
        let mut parts = AddressParts {
            street: Some("123 Main St".into()),
            ..Default::default()
        };
        parts.merge(AddressParts {
            city: Some("Springfield".into()),
            postal_code: Some("62704".into()),
            ..Default::default()
        });
        assert_eq!(parts.street.as_deref(), Some("123 Main St"));
        assert_eq!(parts.city.as_deref(), Some("Springfield"));
        assert_eq!(parts.outstanding(), vec!["state"]);
    }

    #[test]
    fn referral_status_serde_and_display() {
        let status: ReferralStatus = serde_json::from_str("\"has_referral\"").unwrap();
        assert_eq!(status, ReferralStatus::HasReferral);
        assert_eq!(ReferralStatus::from_bool(false).to_string(), "no");
        assert!(!ReferralStatus::Unknown.is_known());
    }

    #[test]
    fn full_name_handles_partial_names() {
        let mut record = PatientRecord::new();
        assert!(record.full_name().is_none());
        record.first_name = Some("Jane".into());
        assert_eq!(record.full_name().unwrap(), "Jane");
        record.last_name = Some("Doe".into());
        assert_eq!(record.full_name().unwrap(), "Jane Doe");
    }
}
