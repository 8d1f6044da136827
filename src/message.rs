// MIT License - Copyright (c) 2026 Peter Wright
// Eufy Security bridge

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::config::LoginOptions;
use crate::constants::{EVENT_COMMAND_RESULT, P2PConnectionType};

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// A message delivered by the host.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    #[serde(default)]
    pub topic: Option<String>,
    pub payload: CommandRequest,
}

impl From<CommandRequest> for InboundMessage {
    fn from(payload: CommandRequest) -> Self {
        Self {
            topic: None,
            payload,
        }
    }
}

/// An argument as received: either the expected type, or the raw JSON that
/// failed to convert.
///
/// Keeps one mistyped field from rejecting the whole request; the dispatcher
/// reports it as an invalid field of the command instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Lenient<T> {
    Valid(T),
    Invalid(Value),
}

impl<T> From<T> for Lenient<T> {
    fn from(v: T) -> Self {
        Lenient::Valid(v)
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Lenient<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(match T::deserialize(&raw) {
            Ok(v) => Lenient::Valid(v),
            Err(_) => Lenient::Invalid(raw),
        })
    }
}

impl<T: Serialize> Serialize for Lenient<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Lenient::Valid(v) => v.serialize(serializer),
            Lenient::Invalid(raw) => raw.serialize(serializer),
        }
    }
}

/// The command and its arguments. Which fields are required depends on the command.
///
/// Any JSON object parses: a missing or non-string `command` becomes a name
/// no command matches, and mistyped arguments are kept as [`Lenient::Invalid`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    #[serde(default, deserialize_with = "command_name")]
    pub command: String,
    #[serde(default, rename = "stationSN", skip_serializing_if = "Option::is_none")]
    pub station_sn: Option<Lenient<String>>,
    #[serde(default, rename = "deviceSN", skip_serializing_if = "Option::is_none")]
    pub device_sn: Option<Lenient<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Lenient<String>>,
    /// An explicit `null` is kept as `Some(Value::Null)`.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seconds: Option<Lenient<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p2p_connection_type: Option<Lenient<P2PConnectionType>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<Lenient<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify_code: Option<Lenient<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_options: Option<Lenient<LoginOptions>>,
}

fn command_name<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        other => other.to_string(),
    })
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl CommandRequest {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// A message handed to the host for routing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundMessage {
    pub topic: String,
    pub payload: Payload,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Event(EventPayload),
    CommandResult(CommandResult),
}

/// `{ event, ...named fields }` for a forwarded client event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventPayload {
    pub event: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// `{ event: "command result", command, result?, error? }`.
///
/// Build with [`CommandResult::success`] or [`CommandResult::failure`] so that
/// `result` and `error` are never both present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandResult {
    event: &'static str,
    command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<Value>,
}

impl CommandResult {
    /// A successful command. `None` leaves the `result` field out entirely.
    pub fn success(command: impl Into<String>, result: Option<Value>) -> Self {
        Self {
            event: EVENT_COMMAND_RESULT,
            command: command.into(),
            result,
            error: None,
        }
    }

    pub fn failure(command: impl Into<String>, error: Value) -> Self {
        Self {
            event: EVENT_COMMAND_RESULT,
            command: command.into(),
            result: None,
            error: Some(error),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&Value> {
        self.error.as_ref()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

impl OutboundMessage {
    pub fn event(topic: impl Into<String>, event: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            topic: topic.into(),
            payload: Payload::Event(EventPayload {
                event: event.into(),
                fields,
            }),
        }
    }

    pub fn command_result(topic: impl Into<String>, result: CommandResult) -> Self {
        Self {
            topic: topic.into(),
            payload: Payload::CommandResult(result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_inbound_message() {
        let msg: InboundMessage = serde_json::from_value(json!({
            "payload": {
                "command": "set station property",
                "stationSN": "T8010N1234",
                "name": "guardMode",
                "value": 1
            }
        }))
        .unwrap();

        assert_eq!(msg.payload.command, "set station property");
        assert_eq!(msg.payload.station_sn, Some(Lenient::Valid("T8010N1234".to_string())));
        assert_eq!(msg.payload.name, Some(Lenient::Valid("guardMode".to_string())));
        assert_eq!(msg.payload.value, Some(json!(1)));
        assert_eq!(msg.payload.device_sn, None);
    }

    #[test]
    fn test_parse_camel_case_fields() {
        let req: CommandRequest = serde_json::from_value(json!({
            "command": "connect to station",
            "stationSN": "T8010N1234",
            "p2pConnectionType": 2,
            "deviceSN": "T8113N5678",
            "channel": 3,
            "seconds": 60
        }))
        .unwrap();

        assert_eq!(req.p2p_connection_type, Some(Lenient::Valid(P2PConnectionType::Quickest)));
        assert_eq!(req.device_sn, Some(Lenient::Valid("T8113N5678".to_string())));
        assert_eq!(req.channel, Some(Lenient::Valid(3)));
        assert_eq!(req.seconds, Some(Lenient::Valid(60)));
    }

    #[test]
    fn test_mistyped_fields_do_not_reject_request() {
        let req: CommandRequest = serde_json::from_value(json!({
            "command": "connect to station",
            "seconds": "60",
            "channel": -1,
            "p2pConnectionType": 300
        }))
        .unwrap();

        assert_eq!(req.command, "connect to station");
        assert_eq!(req.seconds, Some(Lenient::Invalid(json!("60"))));
        assert_eq!(req.channel, Some(Lenient::Invalid(json!(-1))));
        assert_eq!(req.p2p_connection_type, Some(Lenient::Invalid(json!(300))));
    }

    #[test]
    fn test_missing_or_odd_command_still_parses() {
        let req: CommandRequest = serde_json::from_value(json!({ "stationSN": "T8010N1234" })).unwrap();
        assert_eq!(req.command, "");

        let req: CommandRequest = serde_json::from_value(json!({ "command": 42 })).unwrap();
        assert_eq!(req.command, "42");
    }

    #[test]
    fn test_explicit_null_value_is_kept() {
        let req: CommandRequest =
            serde_json::from_value(json!({ "command": "set device property", "value": null })).unwrap();
        assert_eq!(req.value, Some(Value::Null));

        let req: CommandRequest =
            serde_json::from_value(json!({ "command": "set device property" })).unwrap();
        assert_eq!(req.value, None);
    }

    #[test]
    fn test_request_serializes_raw_invalid_values() {
        let mut req = CommandRequest::new("get station device");
        req.station_sn = Some("T8010N1234".to_string().into());
        req.channel = Some(Lenient::Invalid(json!("one")));
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "command": "get station device", "stationSN": "T8010N1234", "channel": "one" })
        );
    }

    #[test]
    fn test_event_payload_is_flat() {
        let mut fields = Map::new();
        fields.insert("message".to_string(), json!("hello"));
        let msg = OutboundMessage::event("eufy", "push message", fields);
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({ "topic": "eufy", "payload": { "event": "push message", "message": "hello" } })
        );
    }

    #[test]
    fn test_command_result_omits_absent_result() {
        let msg = OutboundMessage::command_result("eufy", CommandResult::success("close", None));
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({ "topic": "eufy", "payload": { "event": "command result", "command": "close" } })
        );
    }

    #[test]
    fn test_command_result_error() {
        let result = CommandResult::failure("foo", json!({ "message": "Unknown command" }));
        assert!(result.is_error());
        assert_eq!(result.result(), None);
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({ "event": "command result", "command": "foo", "error": { "message": "Unknown command" } })
        );
    }
}
