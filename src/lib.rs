//! Intake Assist: slot-filling controller for a voice scheduling assistant.

pub mod config;
pub mod context;
pub mod error;
pub mod intake;
pub mod notify;
pub mod session;
pub mod tools;
