//! Call context handed to every tool invocation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Context for one live call.
#[derive(Debug, Clone, Serialize)]
pub struct CallContext {
    /// Unique call ID, carried on every log event.
    pub call_id: Uuid,
    /// Identifier of the call resource (room) the session collaborator tears down.
    pub session_id: String,
    /// When the call started; the hang-up log reports the call's duration from it.
    pub started_at: DateTime<Utc>,
}

impl Default for CallContext {
    fn default() -> Self {
        let call_id = Uuid::new_v4();
        Self {
            call_id,
            session_id: format!("call-{call_id}"),
            started_at: Utc::now(),
        }
    }
}

impl CallContext {
    /// Create a context for the given session (room) identifier.
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            ..Default::default()
        }
    }
}
