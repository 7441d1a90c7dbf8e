//! Intake core: the slot-filled patient record and the controller that
//! gates confirmation, email, and hang-up on it.
//!
//! The dialogue layer hands already-extracted values to the controller's
//! setters, reads back the confirmation text, and asks for the missing and
//! gathered snapshots before each turn to build the next prompt.

pub mod controller;
pub mod directory;
pub mod fields;
pub mod format;
pub mod prompts;
pub mod record;

pub use controller::{HangupDecision, HangupRefusal, IntakeController};
pub use directory::{Provider, ProviderDirectory};
pub use prompts::intake_system_prompt;
pub use record::{AddressParts, PatientRecord, ReferralStatus};
