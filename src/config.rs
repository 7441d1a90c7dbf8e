//! Configuration types.

use std::path::PathBuf;

use crate::error::ConfigError;

/// Default persona line placed at the top of every per-turn system prompt.
pub const DEFAULT_PERSONA: &str = "\
You are a friendly scheduling assistant for a medical clinic, speaking with a \
patient over the phone to book their first appointment.";

/// Agent configuration.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Agent name for identification in logs and prompts.
    pub name: String,
    /// Opening line of the system prompt.
    pub persona: String,
    /// Optional JSON provider catalog. The built-in sample catalog is used when unset.
    pub providers_path: Option<PathBuf>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "intake-assist".to_string(),
            persona: DEFAULT_PERSONA.to_string(),
            providers_path: None,
        }
    }
}

impl AgentConfig {
    /// Build config from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(name) = std::env::var("INTAKE_AGENT_NAME") {
            let name = name.trim();
            if name.is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: "INTAKE_AGENT_NAME".to_string(),
                    message: "must not be empty".to_string(),
                });
            }
            config.name = name.to_string();
        }

        if let Ok(persona) = std::env::var("INTAKE_PERSONA")
            && !persona.trim().is_empty()
        {
            config.persona = persona;
        }

        config.providers_path = std::env::var("INTAKE_PROVIDERS_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Ok(config)
    }
}
