// MIT License - Copyright (c) 2026 Peter Wright
// Eufy Security bridge
//
//! # eufy-security-bridge
//!
//! Adapter between a Eufy Security client and a message-routing host.
//!
//! The bridge maps host configuration onto the client's configuration,
//! forwards selected client events as flat JSON payloads, and turns inbound
//! command messages into client calls answered with a `command result`
//! envelope. The client itself (cloud login, push, P2P) lives behind the
//! [`SecurityClient`] trait; the host behind [`Host`]. An MQTT host is
//! included in [`mqtt`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use eufy_security_bridge::{mqtt, ClientFactory};
//!
//! async fn bridge<F: ClientFactory>(factory: F) -> eufy_security_bridge::Result<()> {
//!     let config = mqtt::BridgeConfig::load("config.toml")?;
//!     mqtt::run(config, factory).await
//! }
//! ```

pub mod client;
pub mod command;
pub mod config;
pub mod constants;
pub mod devices;
pub mod error;
pub mod event;
pub mod host;
pub mod message;
pub mod mqtt;
pub mod node;
pub mod registry;
pub mod status;
pub mod value;

// Re-exports for convenience
pub use client::{ClientFactory, SecurityClient};
pub use command::{Command, dispatch};
pub use config::{
    Captcha, ClientConfig, ClientConfigBuilder, ConfigMapping, Credentials, HostConfig,
    LoginOptions, map_config,
};
pub use constants::{P2PConnectionType, PropertyName};
pub use devices::{Device, Station};
pub use error::{BridgeError, ClientError, ClientResult, Result};
pub use event::{ClientEvent, EventReceiver, EventSender, event_channel};
pub use host::Host;
pub use message::{
    CommandRequest, CommandResult, InboundMessage, Lenient, OutboundMessage, Payload,
};
pub use node::{NodeSettings, SecurityNode};
pub use registry::{EventDescriptor, EventRegistry};
pub use status::{NodeStatus, StatusFill};
pub use value::{ClientValue, PropertyBag, PropertyValue};
