// MIT License - Copyright (c) 2026 Peter Wright
// Eufy Security bridge

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single live attribute of a station or device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyValue {
    pub value: Value,
    /// Milliseconds since the epoch at which the value was reported.
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<u64>,
}

impl PropertyValue {
    pub fn new(value: impl Into<Value>, timestamp: u64) -> Self {
        Self {
            value: value.into(),
            timestamp,
            modified: None,
        }
    }
}

/// The client's attribute snapshot for a station or device, keyed by property name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyBag(BTreeMap<String, PropertyValue>);

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: PropertyValue) -> Option<PropertyValue> {
        self.0.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PropertyValue)> {
        self.0.iter()
    }

    /// Flatten to `name -> bare value`, dropping timestamp metadata.
    ///
    /// Produces a new map; the bag itself is left untouched.
    pub fn flatten(&self) -> Map<String, Value> {
        self.0
            .iter()
            .map(|(name, prop)| (name.clone(), prop.value.clone()))
            .collect()
    }
}

impl<K: Into<String>> FromIterator<(K, PropertyValue)> for PropertyBag {
    fn from_iter<I: IntoIterator<Item = (K, PropertyValue)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// A value handed to the bridge by the client, either as an event argument
/// or as the result of an operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ClientValue {
    /// No meaningful value.
    #[default]
    Undefined,
    /// Plain data, passed through unchanged.
    Json(Value),
    /// A station or device exposing its property bag.
    Entity(PropertyBag),
    List(Vec<ClientValue>),
}

impl ClientValue {
    /// Replace property bags with flat `name -> value` objects.
    ///
    /// `Undefined` yields `None`; inside a list it becomes `null` so the
    /// list keeps its length.
    pub fn unwrap_properties(&self) -> Option<Value> {
        match self {
            ClientValue::Undefined => None,
            ClientValue::Json(v) => Some(v.clone()),
            ClientValue::Entity(bag) => Some(Value::Object(bag.flatten())),
            ClientValue::List(items) => Some(Value::Array(
                items
                    .iter()
                    .map(|item| item.unwrap_properties().unwrap_or(Value::Null))
                    .collect(),
            )),
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, ClientValue::Undefined)
    }
}

impl From<()> for ClientValue {
    fn from(_: ()) -> Self {
        ClientValue::Undefined
    }
}

impl From<Value> for ClientValue {
    fn from(v: Value) -> Self {
        ClientValue::Json(v)
    }
}

impl From<bool> for ClientValue {
    fn from(v: bool) -> Self {
        ClientValue::Json(Value::Bool(v))
    }
}

impl From<u64> for ClientValue {
    fn from(v: u64) -> Self {
        ClientValue::Json(Value::from(v))
    }
}

impl From<String> for ClientValue {
    fn from(v: String) -> Self {
        ClientValue::Json(Value::String(v))
    }
}

impl From<&str> for ClientValue {
    fn from(v: &str) -> Self {
        ClientValue::Json(Value::String(v.to_string()))
    }
}

impl From<PropertyBag> for ClientValue {
    fn from(bag: PropertyBag) -> Self {
        ClientValue::Entity(bag)
    }
}

impl<T: Into<ClientValue>> From<Vec<T>> for ClientValue {
    fn from(items: Vec<T>) -> Self {
        ClientValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ClientValue>> From<Option<T>> for ClientValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or_default()
    }
}
