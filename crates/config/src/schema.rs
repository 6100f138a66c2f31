use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlazaConfig {
    pub auth: AuthConfig,
    pub session: SessionConfig,
}

/// Token-endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// URL of the external token-issuing endpoint.
    pub issuer_url: Option<String>,

    /// Credential validity window in seconds.
    pub token_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer_url: None,
            token_ttl_secs: 3600,
        }
    }
}

/// Session behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Announce joins and leaves on the affected channel.
    pub announce_joins: bool,

    /// Tab label for the shared town channel.
    pub town_label: String,

    /// Tab label for the bot-assisted help channel.
    pub help_label: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            announce_joins: true,
            town_label: "Town Chat".to_string(),
            help_label: "Help".to_string(),
        }
    }
}
