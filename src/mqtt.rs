// MIT License - Copyright (c) 2026 Peter Wright
// Eufy Security bridge

//! MQTT host: commands arrive on one topic, envelopes and status go out on others.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use serde::{Deserialize, Serialize};
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::mpsc;
use tokio::time::Duration;
use tracing::{debug, error, info, warn};

use crate::client::ClientFactory;
use crate::config::{ClientConfig, Credentials, HostConfig, map_config};
use crate::error::{BridgeError, Result};
use crate::host::Host;
use crate::message::{CommandRequest, InboundMessage, OutboundMessage};
use crate::node::{NodeSettings, SecurityNode};
use crate::status::{NodeStatus, StatusFill};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// The bridge's TOML file.
///
/// A missing `[eufy]` table leaves the node unconfigured, the same as a host
/// node with no config reference.
#[derive(Debug, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub eufy: Option<HostConfig>,
    #[serde(default)]
    pub credentials: Credentials,
    #[serde(default)]
    pub node: NodeSettings,
    pub mqtt: MqttSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MqttSettings {
    pub url: String,
    #[serde(default = "default_client_id")]
    pub client_id: String,
    #[serde(default = "default_subscribe_topic")]
    pub subscribe_topic: String,
    #[serde(default = "default_publish_topic")]
    pub publish_topic: String,
}

fn default_client_id() -> String {
    "eufy-bridge".to_string()
}
fn default_subscribe_topic() -> String {
    "eufy/cmd".to_string()
}
fn default_publish_topic() -> String {
    "eufy".to_string()
}

impl BridgeConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Client configuration, or `None` when the `[eufy]` table is absent.
    pub fn client_config(&self) -> Result<Option<ClientConfig>> {
        match &self.eufy {
            Some(host) => Ok(Some(map_config(host, &self.credentials)?.config)),
            None => Ok(None),
        }
    }

    /// Node settings; an empty node topic falls back to the publish topic.
    pub fn node_settings(&self) -> NodeSettings {
        let mut settings = self.node.clone();
        if settings.topic.is_empty() {
            settings.topic = self.mqtt.publish_topic.clone();
        }
        settings
    }
}

/// Parse an MQTT URL like "mqtt://host:port" into (host, port).
pub fn parse_mqtt_url(url: &str) -> Result<(String, u16)> {
    let invalid = || BridgeError::InvalidConfigValue {
        field: "mqtt.url",
        value: url.to_string(),
    };

    let stripped = url
        .strip_prefix("mqtt://")
        .or_else(|| url.strip_prefix("tcp://"))
        .unwrap_or(url);

    let (host, port_str) = stripped.rsplit_once(':').ok_or_else(invalid)?;
    let port: u16 = port_str.parse().map_err(|_| invalid())?;
    if host.is_empty() {
        return Err(invalid());
    }

    Ok((host.to_string(), port))
}

// ---------------------------------------------------------------------------
// Host
// ---------------------------------------------------------------------------

/// Retained status message: `{now, status, fill}`.
#[derive(Debug, Serialize)]
pub struct MqttStatus {
    pub now: u64,
    pub status: &'static str,
    pub fill: StatusFill,
}

impl MqttStatus {
    pub fn new(status: NodeStatus) -> Self {
        Self {
            now: now_epoch_ms(),
            status: status.label(),
            fill: status.fill(),
        }
    }
}

fn now_epoch_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

async fn publish_json(client: &AsyncClient, topic: &str, payload: &impl Serialize, retain: bool) {
    match serde_json::to_string(payload) {
        Ok(json) => {
            if let Err(e) = client.publish(topic, QoS::AtLeastOnce, retain, json).await {
                error!("Failed to publish to {topic}: {e}");
            }
        }
        Err(e) => error!("Failed to serialize MQTT payload: {e}"),
    }
}

/// Publishes each envelope to its message topic and status to
/// `<publish_topic>/status`.
pub struct MqttHost {
    client: AsyncClient,
    status_topic: String,
}

impl MqttHost {
    pub fn new(client: AsyncClient, publish_topic: &str) -> Self {
        Self {
            client,
            status_topic: format!("{publish_topic}/status"),
        }
    }
}

#[async_trait]
impl Host for MqttHost {
    async fn send(&self, message: OutboundMessage) {
        publish_json(&self.client, &message.topic, &message.payload, false).await;
    }

    async fn status(&self, status: NodeStatus) {
        info!("Status: {status}");
        publish_json(&self.client, &self.status_topic, &MqttStatus::new(status), true).await;
    }
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// Run the bridge until SIGINT or SIGTERM.
///
/// The MQTT event loop starts before the node so status updates flow while
/// the client connects; commands received meanwhile wait in a channel.
pub async fn run<F>(config: BridgeConfig, factory: F) -> Result<()>
where
    F: ClientFactory,
{
    let client_config = config.client_config()?;
    let settings = config.node_settings();
    let (mqtt_host, mqtt_port) = parse_mqtt_url(&config.mqtt.url)?;
    let subscribe_topic = config.mqtt.subscribe_topic.clone();

    let mut sigterm = signal(SignalKind::terminate())?;

    let mut mqtt_opts = MqttOptions::new(&config.mqtt.client_id, &mqtt_host, mqtt_port);
    mqtt_opts.set_keep_alive(Duration::from_secs(30));
    let (client, mut eventloop) = AsyncClient::new(mqtt_opts, 256);

    // Task 1: MQTT event loop, parses commands into the channel
    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<InboundMessage>();
    let client_sub = client.clone();
    let sub_topic = subscribe_topic.clone();
    let mqtt_handle = tokio::spawn(async move {
        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    // rumqttc does not resubscribe after a reconnect
                    info!("MQTT: connected, subscribing to {sub_topic}");
                    if let Err(e) = client_sub.subscribe(&sub_topic, QoS::AtLeastOnce).await {
                        error!("Failed to subscribe to {sub_topic}: {e}");
                    }
                }
                Ok(Event::Incoming(Packet::Publish(msg))) => {
                    if msg.topic != sub_topic {
                        continue;
                    }
                    let payload = String::from_utf8_lossy(&msg.payload);
                    match serde_json::from_str::<CommandRequest>(&payload) {
                        Ok(request) => {
                            debug!("MQTT command received: {payload}");
                            let inbound = InboundMessage {
                                topic: Some(msg.topic.clone()),
                                payload: request,
                            };
                            if cmd_tx.send(inbound).is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!("Failed to parse MQTT command: {e}"),
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    error!("MQTT event loop error: {e}");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    });

    let host = Arc::new(MqttHost::new(client.clone(), &config.mqtt.publish_topic));
    let node = match SecurityNode::start(settings, client_config, &factory, host).await {
        Ok(node) => Arc::new(node),
        Err(e) => {
            mqtt_handle.abort();
            return Err(e);
        }
    };

    // Task 2: one task per command, nothing is queued behind a slow call
    let cmd_node = Arc::clone(&node);
    let cmd_handle = tokio::spawn(async move {
        while let Some(inbound) = cmd_rx.recv().await {
            let node = Arc::clone(&cmd_node);
            tokio::spawn(async move {
                node.handle_input(inbound).await;
            });
        }
    });

    info!("MQTT bridge running. Send SIGINT/SIGTERM to stop.");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received SIGINT, shutting down...");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down...");
        }
    }

    cmd_handle.abort();
    node.stop().await;
    if let Err(e) = client.disconnect().await {
        warn!("Error disconnecting from MQTT broker: {e}");
    }
    mqtt_handle.abort();

    info!("Shutdown complete");
    Ok(())
}
