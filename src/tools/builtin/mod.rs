//! Built-in tools exposing the intake controller to the dialogue layer.

pub mod call;
pub mod intake;
pub mod scheduling;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::intake::IntakeController;

/// Controller shared by every tool registered for one call.
pub type SharedController = Arc<Mutex<IntakeController>>;
