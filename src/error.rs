// MIT License - Copyright (c) 2026 Peter Wright
// Eufy Security bridge

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A failure raised by the vendor client.
///
/// The bridge never interprets these. They are forwarded verbatim in the
/// `error` field of a command result so callers can inspect vendor detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct ClientError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

impl ClientError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            detail: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = Some(detail);
        self
    }
}

/// All errors that can occur in the bridge.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {value:?}")]
    InvalidConfigValue { field: &'static str, value: String },

    #[error("Eufy config missing")]
    MissingConfigReference,

    #[error("Unknown command")]
    UnknownCommand { command: String },

    #[error("Cannot set unknown {target} property: \"{name}\"")]
    UnknownProperty { target: &'static str, name: String },

    #[error("Missing field {field} for command \"{command}\"")]
    MissingField { command: &'static str, field: &'static str },

    #[error("Invalid field {field} for command \"{command}\": {reason}")]
    InvalidField {
        command: &'static str,
        field: &'static str,
        reason: String,
    },

    #[error("Argument name \"{name}\" of event \"{event}\" is reserved")]
    ReservedArgumentName { event: String, name: String },

    #[error("Argument name \"{name}\" appears more than once in event \"{event}\"")]
    DuplicateArgumentName { event: String, name: String },

    #[error("Event \"{0}\" is registered more than once")]
    DuplicateEvent(String),

    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    #[error("MQTT client error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BridgeError {
    /// JSON placed in the `error` field of a command result.
    ///
    /// Client failures keep their original shape; every other error becomes
    /// `{ "message": ... }`.
    pub fn to_payload(&self) -> Value {
        match self {
            BridgeError::Client(e) => {
                serde_json::to_value(e).unwrap_or_else(|_| json!({ "message": e.message }))
            }
            other => json!({ "message": other.to_string() }),
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_command_payload() {
        let err = BridgeError::UnknownCommand {
            command: "foo".to_string(),
        };
        assert_eq!(err.to_payload(), json!({ "message": "Unknown command" }));
    }

    #[test]
    fn test_client_error_payload_is_verbatim() {
        let err = BridgeError::from(
            ClientError::new("Station not found")
                .with_code("DEVICE_NOT_FOUND")
                .with_detail(json!({ "stationSN": "T8010N1234" })),
        );
        assert_eq!(
            err.to_payload(),
            json!({
                "message": "Station not found",
                "code": "DEVICE_NOT_FOUND",
                "detail": { "stationSN": "T8010N1234" }
            })
        );
    }

    #[test]
    fn test_missing_field_message() {
        let err = BridgeError::MissingField {
            command: "get station",
            field: "stationSN",
        };
        assert_eq!(
            err.to_string(),
            "Missing field stationSN for command \"get station\""
        );
    }
}
