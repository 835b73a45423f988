use serde::Deserialize;

use crate::error::RelayError;
use crate::types::RenderMode;

/// Relay configuration loaded from environment variables.
///
/// Loaded once at process start and passed into the dispatcher by value;
/// nothing reads the environment after startup.
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Name of the webhook secret in the secret store
    pub secret_name: String,

    /// Session token for the local secret store side-channel
    pub session_token: String,

    /// Renderer variant used for outbound messages (default: simple)
    pub render_mode: RenderMode,
}

impl RelayConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, RelayError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            secret_name: std::env::var("SECRET_NAME").map_err(|_| {
                RelayError::Configuration("SECRET_NAME environment variable is required".into())
            })?,
            session_token: std::env::var("AWS_SESSION_TOKEN").map_err(|_| {
                RelayError::Configuration(
                    "AWS_SESSION_TOKEN environment variable is required".into(),
                )
            })?,
            render_mode: match std::env::var("RENDER_MODE") {
                Ok(value) => value.parse()?,
                Err(_) => RenderMode::default(),
            },
        })
    }
}
