//! Application configuration loaded from environment variables.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// GCP project ID hosting the Firestore database
    pub gcp_project_id: String,
    /// Google OAuth client ID (the expected ID-token audience)
    pub google_client_id: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// For local development, set `FIRESTORE_EMULATOR_HOST` to use the
    /// emulator instead of a live project.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            google_client_id: env::var("GOOGLE_CLIENT_ID")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("GOOGLE_CLIENT_ID"))?,
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            gcp_project_id: "test-project".to_string(),
            google_client_id: "test-client-id.apps.googleusercontent.com".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("GCP_PROJECT_ID", "test-project");
        env::set_var("GOOGLE_CLIENT_ID", "test-id.apps.googleusercontent.com");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.gcp_project_id, "test-project");
        assert_eq!(config.google_client_id, "test-id.apps.googleusercontent.com");
    }
}
