// MIT License - Copyright (c) 2026 Peter Wright
// Eufy Security bridge

use serde_json::Value;

use crate::value::{ClientValue, PropertyBag};

/// A camera or sensor managed by a station.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub serial_number: String,
    pub station_serial_number: String,
    /// P2P channel of the device on its station.
    pub channel: u32,
    pub properties: PropertyBag,
}

impl Device {
    pub fn new(
        serial_number: impl Into<String>,
        station_serial_number: impl Into<String>,
        channel: u32,
        properties: PropertyBag,
    ) -> Self {
        Self {
            serial_number: serial_number.into(),
            station_serial_number: station_serial_number.into(),
            channel,
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

impl From<Device> for ClientValue {
    fn from(device: Device) -> Self {
        ClientValue::Entity(device.properties)
    }
}
