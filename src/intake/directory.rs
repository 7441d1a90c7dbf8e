//! Provider directory and complaint-based provider suggestion.

use std::path::Path;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::format::spoken_datetime;
use crate::error::{ConfigError, IntakeError};

/// Maximum number of providers offered per suggestion.
pub const MAX_SUGGESTIONS: usize = 3;

/// Complaint words shorter than this are ignored when matching ("in", "my").
const MIN_KEYWORD_LEN: usize = 3;

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-z0-9]+").unwrap());

/// A bookable provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub name: String,
    pub specialty: String,
    pub background: String,
    /// Offered slots, as configured. Not necessarily sorted or unique.
    #[serde(with = "slot_format")]
    pub available_times: Vec<NaiveDateTime>,
}

impl Provider {
    /// Whether any complaint keyword overlaps a word of the specialty tag.
    fn matches(&self, keywords: &[String]) -> bool {
        let specialty = words(&self.specialty);
        keywords.iter().any(|kw| {
            specialty
                .iter()
                .any(|sw| sw.contains(kw.as_str()) || kw.contains(sw.as_str()))
        })
    }

    /// Name, specialty, times, background, in that order.
    pub fn describe(&self) -> String {
        let times = self
            .available_times
            .iter()
            .map(spoken_datetime)
            .collect::<Vec<_>>()
            .join("; ");
        format!(
            "{}\nSpecialty: {}\nAvailable times: {}\nBackground: {}",
            self.name, self.specialty, times, self.background
        )
    }
}

/// Read-only catalog of providers, in configured order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderDirectory {
    providers: Vec<Provider>,
}

impl ProviderDirectory {
    pub fn new(providers: Vec<Provider>) -> Self {
        Self { providers }
    }

    /// Load a catalog from a JSON file (`{"providers": [...]}`).
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let directory: Self = serde_json::from_str(&raw).map_err(|e| {
            ConfigError::ParseError(format!("provider catalog {}: {}", path.display(), e))
        })?;
        tracing::info!(
            path = %path.display(),
            providers = directory.providers.len(),
            "Loaded provider catalog"
        );
        Ok(directory)
    }

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Case-insensitive lookup by display name.
    pub fn find(&self, name: &str) -> Option<&Provider> {
        let name = name.trim();
        self.providers
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Providers whose specialty overlaps the complaint, capped at
    /// [`MAX_SUGGESTIONS`] and kept in directory order. Falls back to the whole
    /// directory when nothing matches.
    pub fn candidates(&self, complaint: &str) -> Vec<&Provider> {
        let keywords: Vec<String> = words(complaint)
            .into_iter()
            .filter(|w| w.len() >= MIN_KEYWORD_LEN)
            .collect();

        let matched: Vec<&Provider> = self
            .providers
            .iter()
            .filter(|p| p.matches(&keywords))
            .collect();

        let pool = if matched.is_empty() {
            tracing::debug!(complaint, "No specialty match, offering full directory");
            self.providers.iter().collect()
        } else {
            matched
        };

        pool.into_iter().take(MAX_SUGGESTIONS).collect()
    }

    /// Suggestion text for a complaint, ending with a prompt for the patient's choice.
    pub fn suggest(&self, complaint: Option<&str>) -> Result<String, IntakeError> {
        let complaint = complaint
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or(IntakeError::MissingComplaint)?;

        let candidates = self.candidates(complaint);
        if candidates.is_empty() {
            return Ok("There are no providers available to schedule with right now.".to_string());
        }

        let mut out = String::from("Here are the best available providers:\n\n");
        for provider in candidates {
            out.push_str(&provider.describe());
            out.push_str("\n\n");
        }
        out.push_str("Which provider and time would you like to book?");
        Ok(out)
    }

    /// Illustrative catalog used when no catalog file is configured.
    pub fn sample() -> Self {
        Self::new(vec![
            sample_provider(
                "Dr. Emily Carter",
                "Primary Care",
                "Board-certified in Internal Medicine with 15 years of experience. Graduated from Harvard Medical School and completed residency at Massachusetts General Hospital. Special interest in preventive medicine and women's health.",
                &[(2023, 5, 1, 10, 0), (2023, 5, 2, 14, 30)],
            ),
            sample_provider(
                "Dr. Michael Chen",
                "Cardiology",
                "Fellowship-trained in Cardiology from Johns Hopkins. Published researcher in heart failure treatments. Expertise in non-invasive cardiac imaging and preventive cardiology. Board member of the American Heart Association.",
                &[(2023, 5, 3, 11, 15), (2023, 5, 4, 9, 0)],
            ),
            sample_provider(
                "Dr. Sophia Rodriguez",
                "Pediatrics",
                "Board-certified in Pediatrics with a focus on adolescent medicine. Completed fellowship in Adolescent Medicine at Children's Hospital of Philadelphia. Advocate for mental health awareness in teenagers.",
                &[(2023, 5, 4, 10, 0), (2023, 5, 5, 14, 30)],
            ),
            sample_provider(
                "Dr. James Wilson",
                "Endocrinology",
                "Double board-certified in Internal Medicine and Endocrinology. Specializes in diabetes management and thyroid disorders. Pioneered a telemedicine program for rural diabetes patients. Regular speaker at American Diabetes Association conferences.",
                &[(2023, 5, 2, 11, 30), (2023, 5, 3, 15, 0)],
            ),
            sample_provider(
                "Dr. Aisha Patel",
                "Family Medicine & Sports Medicine",
                "Board-certified in Family Medicine with additional certification in Sports Medicine. Former team physician for a professional soccer team. Expertise in non-surgical orthopedics and exercise prescription for chronic diseases.",
                &[(2023, 5, 1, 13, 0), (2023, 5, 5, 10, 30)],
            ),
            sample_provider(
                "Dr. Robert Nguyen",
                "Neurology",
                "Board-certified in Neurology with fellowship training in Movement Disorders. Conducts clinical trials on new treatments for Parkinson's disease. Developed a multidisciplinary approach to treating essential tremor. Fluent in English and Vietnamese.",
                &[(2023, 5, 2, 9, 0), (2023, 5, 4, 14, 0)],
            ),
        ])
    }
}

fn words(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    WORD.find_iter(&lower).map(|m| m.as_str().to_string()).collect()
}

fn sample_provider(
    name: &str,
    specialty: &str,
    background: &str,
    slots: &[(i32, u32, u32, u32, u32)],
) -> Provider {
    Provider {
        name: name.to_string(),
        specialty: specialty.to_string(),
        background: background.to_string(),
        available_times: slots
            .iter()
            .filter_map(|&(y, mo, d, h, mi)| {
                NaiveDate::from_ymd_opt(y, mo, d).and_then(|date| date.and_hms_opt(h, mi, 0))
            })
            .collect(),
    }
}

/// Slots are stored in the same `YYYY-MM-DD HH:MM` form the dialogue layer uses.
mod slot_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::intake::format::DATETIME_FORMAT;

    pub fn serialize<S: Serializer>(slots: &[NaiveDateTime], s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(slots.iter().map(|t| t.format(DATETIME_FORMAT).to_string()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<NaiveDateTime>, D::Error> {
        let raw = Vec::<String>::deserialize(d)?;
        raw.iter()
            .map(|s| {
                NaiveDateTime::parse_from_str(s, DATETIME_FORMAT).map_err(serde::de::Error::custom)
            })
            .collect()
    }
}
