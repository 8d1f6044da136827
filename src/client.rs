// MIT License - Copyright (c) 2026 Peter Wright
// Eufy Security bridge

use async_trait::async_trait;
use serde_json::Value;

use crate::config::{ClientConfig, LoginOptions};
use crate::constants::{P2PConnectionType, PropertyName};
use crate::devices::{Device, Station};
use crate::error::ClientResult;
use crate::event::EventReceiver;

/// The vendor client the bridge drives.
///
/// Implementations own the cloud session, push connection and P2P links;
/// the bridge only forwards calls and listens to [`SecurityClient::subscribe`].
/// Every operation is async, including plain queries, so the dispatcher can
/// treat all commands alike.
#[async_trait]
pub trait SecurityClient: Send + Sync {
    /// Subscribe to client events.
    fn subscribe(&self) -> EventReceiver;

    /// Log in and open the cloud and push connections.
    async fn connect(&self, options: Option<LoginOptions>) -> ClientResult<bool>;

    async fn close(&self) -> ClientResult<()>;

    async fn is_connected(&self) -> ClientResult<bool>;

    async fn is_push_connected(&self) -> ClientResult<bool>;

    async fn get_version(&self) -> ClientResult<String>;

    /// The configuration the client was created with, credentials included.
    async fn get_config(&self) -> ClientResult<ClientConfig>;

    async fn set_camera_max_livestream_duration(&self, seconds: u64) -> ClientResult<()>;

    async fn get_camera_max_livestream_duration(&self) -> ClientResult<u64>;

    async fn refresh_cloud_data(&self) -> ClientResult<()>;

    async fn is_station_connected(&self, station_sn: &str) -> ClientResult<bool>;

    async fn connect_to_station(
        &self,
        station_sn: &str,
        connection_type: Option<P2PConnectionType>,
    ) -> ClientResult<()>;

    async fn get_station(&self, station_sn: &str) -> ClientResult<Station>;

    async fn get_stations(&self) -> ClientResult<Vec<Station>>;

    async fn get_station_device(&self, station_sn: &str, channel: u32) -> ClientResult<Device>;

    async fn get_device(&self, device_sn: &str) -> ClientResult<Device>;

    async fn get_devices(&self) -> ClientResult<Vec<Device>>;

    async fn set_station_property(
        &self,
        station_sn: &str,
        name: PropertyName,
        value: Value,
    ) -> ClientResult<()>;

    async fn set_device_property(
        &self,
        device_sn: &str,
        name: PropertyName,
        value: Value,
    ) -> ClientResult<()>;
}

/// Creates a client from its configuration.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    type Client: SecurityClient + 'static;

    async fn initialize(&self, config: ClientConfig) -> ClientResult<Self::Client>;
}
