// MIT License - Copyright (c) 2026 Peter Wright
// Eufy Security bridge

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};

use crate::constants::{EVENT_FIELD, OTHER_FIELD};
use crate::error::{BridgeError, Result};
use crate::value::ClientValue;

/// Client events the bridge can forward, with the names of their positional
/// arguments in emission order.
pub const EVENT_DEFINITIONS: &[(&str, &[&str])] = &[
    ("connect", &[]),
    ("close", &[]),
    ("connection error", &["error"]),
    ("tfa request", &[]),
    ("captcha request", &["id", "captcha"]),
    ("push connect", &[]),
    ("push close", &[]),
    ("push message", &["message"]),
    ("station added", &["station"]),
    ("station removed", &["station"]),
    ("device added", &["device"]),
    ("device removed", &["device"]),
    ("device connect", &["station"]),
    ("device close", &["station"]),
    ("cloud livestream start", &["station", "camera", "url"]),
    ("cloud livestream stop", &["station", "camera"]),
    (
        "station livestream start",
        &["station", "device", "metadata", "videostream", "audiostream"],
    ),
    ("station livestream stop", &["station", "device"]),
    (
        "station download start",
        &["station", "device", "metadata", "videoStream", "audioStream"],
    ),
    ("station download finish", &["station", "device"]),
    ("station command result", &["station", "result"]),
    ("station rtsp url", &["station", "device", "value", "modified"]),
    ("station guard mode", &["station", "guardMode"]),
    ("station current mode", &["station", "currentMode"]),
    ("station property changed", &["station", "name", "value"]),
    ("station raw property changed", &["station", "type", "value", "modified"]),
    ("station alarm event", &["station", "alarmEvent"]),
    ("device property changed", &["device", "name", "value"]),
    ("device raw property changed", &["device", "type", "value", "modified"]),
    ("device crying detected", &["device", "state"]),
    ("device sound detected", &["device", "state"]),
    ("device pet detected", &["device", "state"]),
    ("device motion detected", &["device", "state"]),
    ("device person detected", &["device", "state", "person"]),
    ("device rings", &["device", "state"]),
    ("device locked", &["device", "state"]),
    ("device open", &["device", "state"]),
];

/// How one client event maps onto named payload fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDescriptor {
    name: String,
    argument_names: Vec<String>,
}

impl EventDescriptor {
    /// Create a descriptor, rejecting argument names that would clash with
    /// the payload's `event` field, the surplus `other` field, or each other.
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        argument_names: impl IntoIterator<Item = S>,
    ) -> Result<Self> {
        let name = name.into();
        let argument_names: Vec<String> = argument_names.into_iter().map(Into::into).collect();

        let mut seen = HashSet::new();
        for arg in &argument_names {
            if arg == OTHER_FIELD || arg == EVENT_FIELD {
                return Err(BridgeError::ReservedArgumentName {
                    event: name,
                    name: arg.clone(),
                });
            }
            if !seen.insert(arg.as_str()) {
                return Err(BridgeError::DuplicateArgumentName {
                    event: name,
                    name: arg.clone(),
                });
            }
        }

        Ok(Self {
            name,
            argument_names,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn argument_names(&self) -> &[String] {
        &self.argument_names
    }

    /// Bind positional arguments to the declared names.
    ///
    /// Property bags are flattened to bare values. Arguments beyond the
    /// declared names are kept, in order, under `other`. Declared names with
    /// no matching argument are left out.
    pub fn transform(&self, args: &[ClientValue]) -> Map<String, Value> {
        let mut fields: Map<String, Value> = self
            .argument_names
            .iter()
            .zip(args)
            .map(|(name, arg)| (name.clone(), arg.unwrap_properties().unwrap_or(Value::Null)))
            .collect();

        if args.len() > self.argument_names.len() {
            let other = args[self.argument_names.len()..]
                .iter()
                .map(|arg| arg.unwrap_properties().unwrap_or(Value::Null))
                .collect();
            fields.insert(OTHER_FIELD.to_string(), Value::Array(other));
        }

        fields
    }
}

/// Immutable lookup from client event name to its descriptor.
#[derive(Debug, Clone)]
pub struct EventRegistry {
    descriptors: HashMap<String, EventDescriptor>,
}

impl EventRegistry {
    pub fn new(descriptors: impl IntoIterator<Item = EventDescriptor>) -> Result<Self> {
        let mut map = HashMap::new();
        for descriptor in descriptors {
            if map.contains_key(descriptor.name()) {
                return Err(BridgeError::DuplicateEvent(descriptor.name));
            }
            map.insert(descriptor.name.clone(), descriptor);
        }
        Ok(Self { descriptors: map })
    }

    /// Registry of every event in [`EVENT_DEFINITIONS`].
    pub fn builtin() -> Result<Self> {
        let descriptors = EVENT_DEFINITIONS
            .iter()
            .map(|(name, args)| EventDescriptor::new(*name, args.iter().copied()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(descriptors)
    }

    pub fn get(&self, event: &str) -> Option<&EventDescriptor> {
        self.descriptors.get(event)
    }

    pub fn contains(&self, event: &str) -> bool {
        self.descriptors.contains_key(event)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn event_names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.keys().map(String::as_str)
    }

    /// Transform an event's arguments, or `None` if the event is not registered.
    pub fn transform(&self, event: &str, args: &[ClientValue]) -> Option<Map<String, Value>> {
        self.get(event).map(|d| d.transform(args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{PropertyBag, PropertyValue};
    use serde_json::json;

    fn bag(value: &str) -> ClientValue {
        let bag: PropertyBag = [("someProperty", PropertyValue::new(value, 123456))]
            .into_iter()
            .collect();
        ClientValue::Entity(bag)
    }

    fn strings(values: &[&str]) -> Vec<ClientValue> {
        values.iter().map(|v| ClientValue::from(*v)).collect()
    }

    #[test]
    fn test_builtin_registry() {
        let registry = EventRegistry::builtin().unwrap();
        assert_eq!(registry.len(), 37);
        assert_eq!(
            registry.get("push message").unwrap().argument_names(),
            &["message".to_string()]
        );
        assert!(registry.contains("captcha request"));
        assert!(!registry.contains("Push Message"));
    }

    #[test]
    fn test_surplus_arguments_go_to_other() {
        let descriptor = EventDescriptor::new("test", ["a", "b", "c"]).unwrap();
        let fields = descriptor.transform(&strings(&["a", "b", "c", "d"]));
        assert_eq!(
            Value::Object(fields),
            json!({ "a": "a", "b": "b", "c": "c", "other": ["d"] })
        );
    }

    #[test]
    fn test_push_message_with_extra_argument() {
        let registry = EventRegistry::builtin().unwrap();
        let fields = registry.transform("push message", &strings(&["a", "b"])).unwrap();
        assert_eq!(Value::Object(fields), json!({ "message": "a", "other": ["b"] }));
    }

    #[test]
    fn test_missing_arguments_are_not_bound() {
        let descriptor = EventDescriptor::new("test", ["a", "b", "c"]).unwrap();
        let fields = descriptor.transform(&strings(&["a"]));
        assert_eq!(Value::Object(fields), json!({ "a": "a" }));
    }

    #[test]
    fn test_bound_field_count() {
        let descriptor = EventDescriptor::new("test", ["a", "b", "c"]).unwrap();
        for n in 0..6 {
            let args: Vec<ClientValue> = (0..n).map(|i| ClientValue::from(i as u64)).collect();
            let fields = descriptor.transform(&args);
            let named = fields.keys().filter(|k| k.as_str() != OTHER_FIELD).count();
            assert_eq!(named, n.min(3));
            match fields.get(OTHER_FIELD) {
                Some(Value::Array(other)) => {
                    let expected: Vec<Value> = (3..n).map(|i| json!(i)).collect();
                    assert_eq!(other, &expected);
                }
                None => assert!(n <= 3),
                Some(v) => panic!("unexpected other: {v}"),
            }
        }
    }

    #[test]
    fn test_undefined_argument_binds_null() {
        let descriptor = EventDescriptor::new("test", ["a", "b"]).unwrap();
        let fields = descriptor.transform(&[ClientValue::Undefined, ClientValue::from(true)]);
        assert_eq!(Value::Object(fields), json!({ "a": null, "b": true }));
    }

    #[test]
    fn test_property_bags_are_unwrapped() {
        let descriptor =
            EventDescriptor::new("test", ["station", "device", "a", "b", "c"]).unwrap();
        let mut args = vec![bag("station value"), bag("device value")];
        args.extend(strings(&["a", "b", "c", "d"]));

        let fields = descriptor.transform(&args);
        assert_eq!(
            Value::Object(fields),
            json!({
                "station": { "someProperty": "station value" },
                "device": { "someProperty": "device value" },
                "a": "a",
                "b": "b",
                "c": "c",
                "other": ["d"]
            })
        );
    }

    #[test]
    fn test_surplus_property_bags_are_unwrapped() {
        let descriptor = EventDescriptor::new("test", Vec::<String>::new()).unwrap();
        let fields = descriptor.transform(&[bag("x")]);
        assert_eq!(Value::Object(fields), json!({ "other": [{ "someProperty": "x" }] }));
    }

    #[test]
    fn test_reserved_argument_names_rejected() {
        assert!(matches!(
            EventDescriptor::new("test", ["a", "other"]),
            Err(BridgeError::ReservedArgumentName { .. })
        ));
        assert!(matches!(
            EventDescriptor::new("test", ["event"]),
            Err(BridgeError::ReservedArgumentName { .. })
        ));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        assert!(matches!(
            EventDescriptor::new("test", ["a", "a"]),
            Err(BridgeError::DuplicateArgumentName { .. })
        ));

        let d = EventDescriptor::new("test", ["a"]).unwrap();
        assert!(matches!(
            EventRegistry::new([d.clone(), d]),
            Err(BridgeError::DuplicateEvent(name)) if name == "test"
        ));
    }

    #[test]
    fn test_unknown_event_not_transformed() {
        let registry = EventRegistry::builtin().unwrap();
        assert!(registry.transform("no such event", &[]).is_none());
    }
}
