// MIT License - Copyright (c) 2026 Peter Wright
// Eufy Security bridge

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::P2PConnectionType;
use crate::error::{BridgeError, Result};

/// Connection configuration handed to the client.
///
/// Field names follow the client's own configuration structure, so the
/// serialized form is what `get config` returns (minus credentials).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// ISO 3166 country code of the account
    pub country: String,
    /// ISO 639 language code
    pub language: String,
    /// Name this bridge registers under as a trusted device
    pub trusted_device_name: String,
    /// Directory the client keeps its session state in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistent_dir: Option<String>,
    pub p2p_connection_setup: P2PConnectionType,
    /// Cloud polling interval in minutes
    pub polling_interval_minutes: u32,
    /// How long a detection event stays active, in seconds
    pub event_duration_seconds: u32,
    /// Whether to accept pending device sharing invitations
    pub accept_invitations: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            country: "US".to_string(),
            language: "en".to_string(),
            trusted_device_name: "eufyclient".to_string(),
            persistent_dir: None,
            p2p_connection_setup: P2PConnectionType::PreferLocal,
            polling_interval_minutes: 10,
            event_duration_seconds: 10,
            accept_invitations: false,
        }
    }
}

impl ClientConfig {
    /// Create a new config builder starting from defaults.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for ClientConfig.
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.config.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.password = Some(password.into());
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.config.country = country.into();
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.config.language = language.into();
        self
    }

    pub fn trusted_device_name(mut self, name: impl Into<String>) -> Self {
        self.config.trusted_device_name = name.into();
        self
    }

    pub fn persistent_dir(mut self, dir: impl Into<String>) -> Self {
        self.config.persistent_dir = Some(dir.into());
        self
    }

    pub fn p2p_connection_setup(mut self, setup: P2PConnectionType) -> Self {
        self.config.p2p_connection_setup = setup;
        self
    }

    pub fn polling_interval_minutes(mut self, minutes: u32) -> Self {
        self.config.polling_interval_minutes = minutes;
        self
    }

    pub fn event_duration_seconds(mut self, seconds: u32) -> Self {
        self.config.event_duration_seconds = seconds;
        self
    }

    pub fn accept_invitations(mut self, accept: bool) -> Self {
        self.config.accept_invitations = accept;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

/// A host-supplied configuration scalar.
///
/// Hosts commonly store every field as text; numbers and booleans are
/// accepted too so hand-written TOML reads naturally.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ConfigScalar {
    Bool(bool),
    Number(i64),
    Text(String),
}

impl ConfigScalar {
    fn invalid(&self, field: &'static str) -> BridgeError {
        let value = match self {
            ConfigScalar::Bool(b) => b.to_string(),
            ConfigScalar::Number(n) => n.to_string(),
            ConfigScalar::Text(s) => s.clone(),
        };
        BridgeError::InvalidConfigValue { field, value }
    }

    pub fn to_u32(&self, field: &'static str) -> Result<u32> {
        match self {
            ConfigScalar::Number(n) => u32::try_from(*n).map_err(|_| self.invalid(field)),
            ConfigScalar::Text(s) => s.trim().parse().map_err(|_| self.invalid(field)),
            ConfigScalar::Bool(_) => Err(self.invalid(field)),
        }
    }

    /// Only a literal `true` (boolean or string) is true, `"false"` and
    /// booleans `false` are false; anything else is rejected.
    pub fn to_bool(&self, field: &'static str) -> Result<bool> {
        match self {
            ConfigScalar::Bool(b) => Ok(*b),
            ConfigScalar::Text(s) if s == "true" => Ok(true),
            ConfigScalar::Text(s) if s == "false" => Ok(false),
            _ => Err(self.invalid(field)),
        }
    }

    pub fn to_p2p_connection_type(&self, field: &'static str) -> Result<P2PConnectionType> {
        let code = self.to_u32(field)?;
        u8::try_from(code)
            .ok()
            .and_then(P2PConnectionType::from_code)
            .ok_or_else(|| self.invalid(field))
    }
}

impl From<&str> for ConfigScalar {
    fn from(s: &str) -> Self {
        ConfigScalar::Text(s.to_string())
    }
}

/// Node configuration as stored by the host.
#[derive(Debug, Clone, Deserialize)]
pub struct HostConfig {
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_trusted_device_name")]
    pub trusted_device_name: String,
    #[serde(default)]
    pub persistent_dir: Option<String>,
    #[serde(default = "default_polling_interval")]
    pub polling_interval_minutes: ConfigScalar,
    #[serde(default = "default_event_duration")]
    pub event_duration_seconds: ConfigScalar,
    #[serde(default = "default_p2p_connection_setup")]
    pub p2p_connection_setup: ConfigScalar,
    #[serde(default = "default_accept_invitations")]
    pub accept_invitations: ConfigScalar,
}

fn default_country() -> String {
    "US".to_string()
}
fn default_language() -> String {
    "en".to_string()
}
fn default_trusted_device_name() -> String {
    "eufyclient".to_string()
}
fn default_polling_interval() -> ConfigScalar {
    ConfigScalar::Number(10)
}
fn default_event_duration() -> ConfigScalar {
    ConfigScalar::Number(10)
}
fn default_p2p_connection_setup() -> ConfigScalar {
    ConfigScalar::Number(0)
}
fn default_accept_invitations() -> ConfigScalar {
    ConfigScalar::Bool(false)
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            country: default_country(),
            language: default_language(),
            trusted_device_name: default_trusted_device_name(),
            persistent_dir: None,
            polling_interval_minutes: default_polling_interval(),
            event_duration_seconds: default_event_duration(),
            p2p_connection_setup: default_p2p_connection_setup(),
            accept_invitations: default_accept_invitations(),
        }
    }
}

/// Account credentials, kept apart from the node configuration by the host.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl Credentials {
    /// Names of the credential fields that are absent or empty.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.username.as_deref().is_none_or(str::is_empty) {
            missing.push("username");
        }
        if self.password.as_deref().is_none_or(str::is_empty) {
            missing.push("password");
        }
        missing
    }
}

/// Result of mapping host configuration onto a [`ClientConfig`].
#[derive(Debug, Clone)]
pub struct ConfigMapping {
    pub config: ClientConfig,
    /// Credential fields that were missing. Reported, never fatal.
    pub missing_credentials: Vec<&'static str>,
}

/// Build the client configuration from the host's node config and credentials.
///
/// Missing credentials are logged and reported but do not stop the mapping;
/// the connection attempt will fail later in the client instead.
pub fn map_config(host: &HostConfig, credentials: &Credentials) -> Result<ConfigMapping> {
    let missing_credentials = credentials.missing();
    if !missing_credentials.is_empty() {
        warn!("Missing credentials: {}", missing_credentials.join(", "));
    }

    let mut builder = ClientConfig::builder()
        .country(&host.country)
        .language(&host.language)
        .trusted_device_name(&host.trusted_device_name)
        .p2p_connection_setup(
            host.p2p_connection_setup
                .to_p2p_connection_type("p2p_connection_setup")?,
        )
        .polling_interval_minutes(
            host.polling_interval_minutes
                .to_u32("polling_interval_minutes")?,
        )
        .event_duration_seconds(host.event_duration_seconds.to_u32("event_duration_seconds")?)
        .accept_invitations(host.accept_invitations.to_bool("accept_invitations")?);

    if let Some(dir) = &host.persistent_dir {
        builder = builder.persistent_dir(dir);
    }
    if let Some(username) = &credentials.username {
        builder = builder.username(username);
    }
    if let Some(password) = &credentials.password {
        builder = builder.password(password);
    }

    Ok(ConfigMapping {
        config: builder.build(),
        missing_credentials,
    })
}

/// Captcha answer for a login that was challenged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Captcha {
    pub captcha_id: String,
    pub captcha_code: String,
}

/// Second-factor data passed to `connect`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captcha: Option<Captcha>,
    #[serde(default)]
    pub force: bool,
}
