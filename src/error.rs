//! Error types for the intake assistant.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Intake error: {0}")]
    Intake(#[from] IntakeError),

    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Recoverable failures of intake operations.
///
/// The `Display` text is what the caller relays back to the patient, so every
/// variant reads as a short explanation rather than a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error("Invalid {field} '{value}': please provide it in {expected} format.")]
    Validation {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("I didn't catch the {field}. Could you say it again?")]
    Blank { field: &'static str },

    #[error("I noted those address details, but I still need the street address.")]
    IncompleteAddress,

    #[error("I still need the reason for your visit before I can suggest providers.")]
    MissingComplaint,

    #[error("No email address is on file, so a confirmation email cannot be sent.")]
    NoRecipient,

    #[error("The information has not been confirmed yet. Please confirm it before the email is sent.")]
    NotConfirmed,

    #[error("Failed to send the confirmation email: {0}")]
    Delivery(String),
}

/// Outbound notification errors.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("SMTP transport failed: {0}")]
    Transport(String),
}

/// Call session errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Teardown request for {session_id} failed: {reason}")]
    TeardownFailed { session_id: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors a tool raises for malformed calls. Intake rejections are not
/// errors at this level; they come back as a `rejected` output.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Tool {name} not found")]
    NotFound { name: String },

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
