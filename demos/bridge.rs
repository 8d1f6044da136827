// MIT License - Copyright (c) 2026 Peter Wright
// Eufy Security bridge
//
// Runs the MQTT bridge against an in-memory client with one station and
// one camera. The camera reports motion every `--motion-interval` seconds.
//
//   cargo run --example bridge -- --config config.example.toml
//
// Then publish e.g. {"command":"get stations"} to the subscribe topic.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;
use serde_json::Value;
use tokio::time::{Duration, interval};
use tracing::info;

use eufy_security_bridge::{
    ClientConfig, ClientError, ClientEvent, ClientFactory, ClientResult, ClientValue, Device,
    EventReceiver, EventSender, LoginOptions, P2PConnectionType, PropertyBag, PropertyName,
    PropertyValue, SecurityClient, Station, event_channel, mqtt,
};

#[derive(Parser)]
#[command(name = "eufy2mqtt-demo")]
#[command(about = "Bridge an in-memory Eufy client to MQTT")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: String,

    /// Seconds between simulated motion events
    #[arg(long, default_value_t = 30)]
    motion_interval: u64,
}

const STATION_SN: &str = "T8010P0000000001";
const DEVICE_SN: &str = "T8113P0000000001";

fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis() as u64
}

// ----- Demo client -----

struct DemoClient {
    config: ClientConfig,
    events: EventSender,
    connected: Arc<AtomicBool>,
    livestream_duration: AtomicU64,
    station: std::sync::Mutex<PropertyBag>,
    device: std::sync::Mutex<PropertyBag>,
    motion_interval: Duration,
}

impl DemoClient {
    fn new(config: ClientConfig, motion_interval: Duration) -> Self {
        let (events, _) = event_channel(64);
        let ts = now_ms();
        let station = [
            ("name", PropertyValue::new("HomeBase", ts)),
            ("model", PropertyValue::new("T8010", ts)),
            ("guardMode", PropertyValue::new(1, ts)),
        ]
        .into_iter()
        .collect();
        let device = [
            ("name", PropertyValue::new("Front Door", ts)),
            ("model", PropertyValue::new("T8113", ts)),
            ("battery", PropertyValue::new(87, ts)),
            ("enabled", PropertyValue::new(true, ts)),
        ]
        .into_iter()
        .collect();

        Self {
            config,
            events,
            connected: Arc::new(AtomicBool::new(false)),
            livestream_duration: AtomicU64::new(30),
            station: std::sync::Mutex::new(station),
            device: std::sync::Mutex::new(device),
            motion_interval,
        }
    }

    fn station_bag(&self) -> PropertyBag {
        self.station.lock().map(|b| b.clone()).unwrap_or_default()
    }

    fn device_bag(&self) -> PropertyBag {
        self.device.lock().map(|b| b.clone()).unwrap_or_default()
    }

    fn check_station(&self, station_sn: &str) -> ClientResult<()> {
        if station_sn == STATION_SN {
            Ok(())
        } else {
            Err(ClientError::new(format!("Station not found: {station_sn}")))
        }
    }

    fn check_device(&self, device_sn: &str) -> ClientResult<()> {
        if device_sn == DEVICE_SN {
            Ok(())
        } else {
            Err(ClientError::new(format!("Device not found: {device_sn}")))
        }
    }

    fn emit(&self, name: &str, args: Vec<ClientValue>) {
        let _ = self.events.send(ClientEvent::new(name, args));
    }
}

#[async_trait]
impl SecurityClient for DemoClient {
    fn subscribe(&self) -> EventReceiver {
        self.events.subscribe()
    }

    async fn connect(&self, _options: Option<LoginOptions>) -> ClientResult<bool> {
        if self.connected.swap(true, Ordering::SeqCst) {
            return Ok(true);
        }
        self.emit("connect", Vec::new());
        self.emit("push connect", Vec::new());

        let events = self.events.clone();
        let connected = Arc::clone(&self.connected);
        let device = self.device_bag();
        let mut ticker = interval(self.motion_interval);
        tokio::spawn(async move {
            ticker.tick().await;
            while connected.load(Ordering::SeqCst) {
                ticker.tick().await;
                let args = vec![ClientValue::Entity(device.clone()), true.into()];
                let _ = events.send(ClientEvent::new("device motion detected", args));
            }
        });
        Ok(true)
    }

    async fn close(&self) -> ClientResult<()> {
        if self.connected.swap(false, Ordering::SeqCst) {
            self.emit("push close", Vec::new());
            self.emit("close", Vec::new());
        }
        Ok(())
    }

    async fn is_connected(&self) -> ClientResult<bool> {
        Ok(self.connected.load(Ordering::SeqCst))
    }

    async fn is_push_connected(&self) -> ClientResult<bool> {
        Ok(self.connected.load(Ordering::SeqCst))
    }

    async fn get_version(&self) -> ClientResult<String> {
        Ok(env!("CARGO_PKG_VERSION").to_string())
    }

    async fn get_config(&self) -> ClientResult<ClientConfig> {
        Ok(self.config.clone())
    }

    async fn set_camera_max_livestream_duration(&self, seconds: u64) -> ClientResult<()> {
        self.livestream_duration.store(seconds, Ordering::SeqCst);
        Ok(())
    }

    async fn get_camera_max_livestream_duration(&self) -> ClientResult<u64> {
        Ok(self.livestream_duration.load(Ordering::SeqCst))
    }

    async fn refresh_cloud_data(&self) -> ClientResult<()> {
        Ok(())
    }

    async fn is_station_connected(&self, station_sn: &str) -> ClientResult<bool> {
        self.check_station(station_sn)?;
        Ok(self.connected.load(Ordering::SeqCst))
    }

    async fn connect_to_station(
        &self,
        station_sn: &str,
        connection_type: Option<P2PConnectionType>,
    ) -> ClientResult<()> {
        self.check_station(station_sn)?;
        let connection_type = connection_type.unwrap_or(self.config.p2p_connection_setup);
        let station = Station::new(station_sn, self.station_bag());
        info!(
            "Demo: P2P connect to {} ({connection_type:?})",
            station.name().unwrap_or(station_sn)
        );
        self.emit("device connect", vec![station.into()]);
        Ok(())
    }

    async fn get_station(&self, station_sn: &str) -> ClientResult<Station> {
        self.check_station(station_sn)?;
        Ok(Station::new(STATION_SN, self.station_bag()))
    }

    async fn get_stations(&self) -> ClientResult<Vec<Station>> {
        Ok(vec![Station::new(STATION_SN, self.station_bag())])
    }

    async fn get_station_device(&self, station_sn: &str, channel: u32) -> ClientResult<Device> {
        self.check_station(station_sn)?;
        if channel != 0 {
            return Err(ClientError::new(format!("No device on channel {channel}")));
        }
        Ok(Device::new(DEVICE_SN, STATION_SN, 0, self.device_bag()))
    }

    async fn get_device(&self, device_sn: &str) -> ClientResult<Device> {
        self.check_device(device_sn)?;
        Ok(Device::new(DEVICE_SN, STATION_SN, 0, self.device_bag()))
    }

    async fn get_devices(&self) -> ClientResult<Vec<Device>> {
        Ok(vec![Device::new(DEVICE_SN, STATION_SN, 0, self.device_bag())])
    }

    async fn set_station_property(
        &self,
        station_sn: &str,
        name: PropertyName,
        value: Value,
    ) -> ClientResult<()> {
        self.check_station(station_sn)?;
        if let Ok(mut bag) = self.station.lock() {
            bag.insert(name.as_str(), PropertyValue::new(value.clone(), now_ms()));
        }
        self.emit(
            "station property changed",
            vec![
                ClientValue::Entity(self.station_bag()),
                name.as_str().into(),
                value.into(),
            ],
        );
        Ok(())
    }

    async fn set_device_property(
        &self,
        device_sn: &str,
        name: PropertyName,
        value: Value,
    ) -> ClientResult<()> {
        self.check_device(device_sn)?;
        let device = Device::new(DEVICE_SN, STATION_SN, 0, self.device_bag());
        info!("Demo: set {name} on {}", device.name().unwrap_or(device_sn));
        if let Ok(mut bag) = self.device.lock() {
            bag.insert(name.as_str(), PropertyValue::new(value.clone(), now_ms()));
        }
        self.emit(
            "device property changed",
            vec![
                ClientValue::Entity(self.device_bag()),
                name.as_str().into(),
                value.into(),
            ],
        );
        Ok(())
    }
}

struct DemoFactory {
    motion_interval: Duration,
}

#[async_trait]
impl ClientFactory for DemoFactory {
    type Client = DemoClient;

    async fn initialize(&self, config: ClientConfig) -> ClientResult<DemoClient> {
        info!("Demo: creating client for country {}", config.country);
        Ok(DemoClient::new(config, self.motion_interval))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG controls verbosity (e.g. RUST_LOG=debug or RUST_LOG=eufy_security_bridge=trace).
    // Default: info.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // systemd journal already adds timestamps
    if std::env::var_os("JOURNAL_STREAM").is_some() {
        tracing_subscriber::fmt().without_time().with_env_filter(env_filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let cli = Cli::parse();

    let config = mqtt::BridgeConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config file {}", cli.config))?;
    let factory = DemoFactory {
        motion_interval: Duration::from_secs(cli.motion_interval.max(1)),
    };

    mqtt::run(config, factory).await.context("Bridge failed")?;
    Ok(())
}
