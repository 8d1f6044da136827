// MIT License - Copyright (c) 2026 Peter Wright
// Eufy Security bridge
//
// Test doubles shared by the integration tests: an in-memory client that
// records every call, and a host that records everything sent to it.

#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::time::{Duration, sleep};

use eufy_security_bridge::{
    ClientConfig, ClientError, ClientEvent, ClientFactory, ClientResult, ClientValue, Device,
    EventSender, Host, LoginOptions, NodeStatus, OutboundMessage, P2PConnectionType, PropertyBag,
    PropertyName, PropertyValue, SecurityClient, Station, event_channel,
};

pub const STATION_SN: &str = "T8010N1234";
pub const DEVICE_SN: &str = "T8113N5678";

pub fn station_bag() -> PropertyBag {
    [
        ("name", PropertyValue::new("Home", 1_700_000_000_000)),
        ("guardMode", PropertyValue::new(1, 1_700_000_000_000)),
    ]
    .into_iter()
    .collect()
}

pub fn device_bag() -> PropertyBag {
    [
        ("name", PropertyValue::new("Front Door", 1_700_000_000_000)),
        ("battery", PropertyValue::new(90, 1_700_000_000_000)),
        ("enabled", PropertyValue::new(true, 1_700_000_000_000)),
    ]
    .into_iter()
    .collect()
}

// ----- Stub client -----

pub struct StubClient {
    events: EventSender,
    config: ClientConfig,
    calls: Mutex<Vec<String>>,
    connected: AtomicBool,
    livestream_duration: AtomicU64,
    connect_error: Mutex<Option<ClientError>>,
    fail_with: Mutex<Option<ClientError>>,
    last_login: Mutex<Option<LoginOptions>>,
}

impl StubClient {
    pub fn new(config: ClientConfig) -> Self {
        let (events, _) = event_channel(64);
        Self {
            events,
            config,
            calls: Mutex::new(Vec::new()),
            connected: AtomicBool::new(false),
            livestream_duration: AtomicU64::new(30),
            connect_error: Mutex::new(None),
            fail_with: Mutex::new(None),
            last_login: Mutex::new(None),
        }
    }

    pub fn connected(self) -> Self {
        self.connected.store(true, Ordering::SeqCst);
        self
    }

    /// Make `connect` fail with `err` and emit `connection error`.
    pub fn connect_fails(self, err: ClientError) -> Self {
        *self.connect_error.lock().unwrap() = Some(err);
        self
    }

    /// Make every other operation fail with `err`.
    pub fn fail_with(&self, err: ClientError) {
        *self.fail_with.lock().unwrap() = Some(err);
    }

    pub fn emit(&self, event: ClientEvent) {
        let _ = self.events.send(event);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls whose first word is `op`.
    pub fn call_count(&self, op: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.split(' ').next() == Some(op))
            .count()
    }

    pub fn last_login(&self) -> Option<LoginOptions> {
        self.last_login.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) -> ClientResult<()> {
        self.calls.lock().unwrap().push(call.into());
        match self.fail_with.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn station(&self, station_sn: &str) -> ClientResult<Station> {
        if station_sn == STATION_SN {
            Ok(Station::new(STATION_SN, station_bag()))
        } else {
            Err(ClientError::new(format!("Station not found: {station_sn}"))
                .with_code("STATION_NOT_FOUND"))
        }
    }

    fn device(&self, device_sn: &str) -> ClientResult<Device> {
        if device_sn == DEVICE_SN {
            Ok(Device::new(DEVICE_SN, STATION_SN, 0, device_bag()))
        } else {
            Err(ClientError::new(format!("Device not found: {device_sn}"))
                .with_code("DEVICE_NOT_FOUND")
                .with_detail(json!({ "deviceSN": device_sn })))
        }
    }
}

#[async_trait]
impl SecurityClient for StubClient {
    fn subscribe(&self) -> eufy_security_bridge::EventReceiver {
        self.events.subscribe()
    }

    async fn connect(&self, options: Option<LoginOptions>) -> ClientResult<bool> {
        self.record("connect")?;
        *self.last_login.lock().unwrap() = options;

        let connect_error = self.connect_error.lock().unwrap().clone();
        if let Some(err) = connect_error {
            self.emit(ClientEvent::new(
                "connection error",
                vec![ClientValue::Json(json!({ "message": err.message }))],
            ));
            return Err(err);
        }

        self.connected.store(true, Ordering::SeqCst);
        self.emit(ClientEvent::bare("connect"));
        Ok(true)
    }

    async fn close(&self) -> ClientResult<()> {
        self.record("close")?;
        self.connected.store(false, Ordering::SeqCst);
        self.emit(ClientEvent::bare("close"));
        Ok(())
    }

    async fn is_connected(&self) -> ClientResult<bool> {
        self.record("is_connected")?;
        Ok(self.connected.load(Ordering::SeqCst))
    }

    async fn is_push_connected(&self) -> ClientResult<bool> {
        self.record("is_push_connected")?;
        Ok(self.connected.load(Ordering::SeqCst))
    }

    async fn get_version(&self) -> ClientResult<String> {
        self.record("get_version")?;
        Ok("2.8.0".to_string())
    }

    async fn get_config(&self) -> ClientResult<ClientConfig> {
        self.record("get_config")?;
        Ok(self.config.clone())
    }

    async fn set_camera_max_livestream_duration(&self, seconds: u64) -> ClientResult<()> {
        self.record(format!("set_camera_max_livestream_duration {seconds}"))?;
        self.livestream_duration.store(seconds, Ordering::SeqCst);
        Ok(())
    }

    async fn get_camera_max_livestream_duration(&self) -> ClientResult<u64> {
        self.record("get_camera_max_livestream_duration")?;
        Ok(self.livestream_duration.load(Ordering::SeqCst))
    }

    async fn refresh_cloud_data(&self) -> ClientResult<()> {
        self.record("refresh_cloud_data")
    }

    async fn is_station_connected(&self, station_sn: &str) -> ClientResult<bool> {
        self.record(format!("is_station_connected {station_sn}"))?;
        Ok(station_sn == STATION_SN)
    }

    async fn connect_to_station(
        &self,
        station_sn: &str,
        connection_type: Option<P2PConnectionType>,
    ) -> ClientResult<()> {
        self.record(format!("connect_to_station {station_sn} {connection_type:?}"))?;
        self.station(station_sn).map(|_| ())
    }

    async fn get_station(&self, station_sn: &str) -> ClientResult<Station> {
        self.record(format!("get_station {station_sn}"))?;
        self.station(station_sn)
    }

    async fn get_stations(&self) -> ClientResult<Vec<Station>> {
        self.record("get_stations")?;
        Ok(vec![Station::new(STATION_SN, station_bag())])
    }

    async fn get_station_device(&self, station_sn: &str, channel: u32) -> ClientResult<Device> {
        self.record(format!("get_station_device {station_sn} {channel}"))?;
        self.station(station_sn)?;
        if channel == 0 {
            self.device(DEVICE_SN)
        } else {
            Err(ClientError::new(format!("No device on channel {channel}")))
        }
    }

    async fn get_device(&self, device_sn: &str) -> ClientResult<Device> {
        self.record(format!("get_device {device_sn}"))?;
        self.device(device_sn)
    }

    async fn get_devices(&self) -> ClientResult<Vec<Device>> {
        self.record("get_devices")?;
        Ok(vec![Device::new(DEVICE_SN, STATION_SN, 0, device_bag())])
    }

    async fn set_station_property(
        &self,
        station_sn: &str,
        name: PropertyName,
        value: Value,
    ) -> ClientResult<()> {
        self.record(format!("set_station_property {station_sn} {name} {value}"))?;
        self.station(station_sn).map(|_| ())
    }

    async fn set_device_property(
        &self,
        device_sn: &str,
        name: PropertyName,
        value: Value,
    ) -> ClientResult<()> {
        self.record(format!("set_device_property {device_sn} {name} {value}"))?;
        self.device(device_sn).map(|_| ())
    }
}

// ----- Stub factory -----

#[derive(Default)]
pub struct StubFactory {
    pub already_connected: bool,
    pub connect_error: Option<ClientError>,
    pub init_error: Option<ClientError>,
    pub seen_config: Mutex<Option<ClientConfig>>,
}

#[async_trait]
impl ClientFactory for StubFactory {
    type Client = StubClient;

    async fn initialize(&self, config: ClientConfig) -> ClientResult<StubClient> {
        *self.seen_config.lock().unwrap() = Some(config.clone());
        if let Some(err) = &self.init_error {
            return Err(err.clone());
        }

        let mut client = StubClient::new(config);
        if self.already_connected {
            client = client.connected();
        }
        if let Some(err) = &self.connect_error {
            client = client.connect_fails(err.clone());
        }
        Ok(client)
    }
}

// ----- Recording host -----

#[derive(Default)]
pub struct RecordingHost {
    messages: Mutex<Vec<OutboundMessage>>,
    statuses: Mutex<Vec<NodeStatus>>,
}

impl RecordingHost {
    pub fn messages(&self) -> Vec<OutboundMessage> {
        self.messages.lock().unwrap().clone()
    }

    /// Message payloads as JSON, in send order.
    pub fn payloads(&self) -> Vec<Value> {
        self.messages()
            .iter()
            .map(|m| serde_json::to_value(&m.payload).unwrap())
            .collect()
    }

    pub fn statuses(&self) -> Vec<NodeStatus> {
        self.statuses.lock().unwrap().clone()
    }

    pub async fn wait_for_messages(&self, count: usize) -> Vec<Value> {
        for _ in 0..200 {
            if self.messages.lock().unwrap().len() >= count {
                return self.payloads();
            }
            sleep(Duration::from_millis(10)).await;
        }
        panic!("Timed out waiting for {count} messages, got {:?}", self.payloads());
    }

    pub async fn wait_for_status(&self, status: NodeStatus) {
        for _ in 0..200 {
            if self.statuses.lock().unwrap().contains(&status) {
                return;
            }
            sleep(Duration::from_millis(10)).await;
        }
        panic!("Timed out waiting for status {status}, got {:?}", self.statuses());
    }
}

#[async_trait]
impl Host for RecordingHost {
    async fn send(&self, message: OutboundMessage) {
        self.messages.lock().unwrap().push(message);
    }

    async fn status(&self, status: NodeStatus) {
        self.statuses.lock().unwrap().push(status);
    }
}
