// MIT License - Copyright (c) 2026 Peter Wright
// Eufy Security bridge

use serde_json::Value;

use crate::value::{ClientValue, PropertyBag};

/// A hub coordinating one or more cameras or sensors.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub serial_number: String,
    pub properties: PropertyBag,
}

impl Station {
    pub fn new(serial_number: impl Into<String>, properties: PropertyBag) -> Self {
        Self {
            serial_number: serial_number.into(),
            properties,
        }
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name).map(|p| &p.value)
    }

    pub fn name(&self) -> Option<&str> {
        self.property("name").and_then(Value::as_str)
    }
}

impl From<Station> for ClientValue {
    fn from(station: Station) -> Self {
        ClientValue::Entity(station.properties)
    }
}
