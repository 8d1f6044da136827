// MIT License - Copyright (c) 2026 Peter Wright
// Eufy Security bridge

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::client::{ClientFactory, SecurityClient};
use crate::command::dispatch;
use crate::config::ClientConfig;
use crate::constants::{
    EVENT_CAPTCHA_REQUEST, EVENT_CLOSE, EVENT_CONNECT, EVENT_CONNECTION_ERROR, EVENT_TFA_REQUEST,
};
use crate::error::{BridgeError, Result};
use crate::event::{ClientEvent, EventReceiver};
use crate::host::Host;
use crate::message::{InboundMessage, OutboundMessage};
use crate::registry::EventRegistry;
use crate::status::NodeStatus;
use crate::value::ClientValue;

/// Per-node settings chosen by the user.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeSettings {
    /// Topic stamped on every outbound message
    #[serde(default)]
    pub topic: String,
    /// Client events to forward, by name
    #[serde(default)]
    pub events: Vec<String>,
}

impl NodeSettings {
    pub fn forwards(&self, event: &str) -> bool {
        self.events.iter().any(|e| e == event)
    }
}

/// One bridge instance: a client, the host it reports to, and the task
/// forwarding client events.
///
/// # Example
///
/// ```no_run
/// # use std::sync::Arc;
/// # use eufy_security_bridge::{ClientFactory, Host, NodeSettings, SecurityNode, ClientConfig};
/// # async fn run<F: ClientFactory, H: Host + 'static>(factory: F, host: Arc<H>) -> eufy_security_bridge::Result<()> {
/// let settings = NodeSettings {
///     topic: "eufy".to_string(),
///     events: vec!["device motion detected".to_string()],
/// };
/// let node = SecurityNode::start(settings, Some(ClientConfig::default()), &factory, host).await?;
///
/// // ... feed inbound messages with node.handle_input(msg).await ...
///
/// node.stop().await;
/// # Ok(())
/// # }
/// ```
pub struct SecurityNode<C, H>
where
    C: SecurityClient + 'static,
    H: Host + 'static,
{
    settings: Arc<NodeSettings>,
    client: Option<Arc<C>>,
    host: Arc<H>,
    pump_handle: Mutex<Option<JoinHandle<()>>>,
    shutdown_tx: watch::Sender<bool>,
}

impl<C, H> SecurityNode<C, H>
where
    C: SecurityClient + 'static,
    H: Host + 'static,
{
    /// Bring a node up.
    ///
    /// Without a client configuration the node reports "Not configured" and
    /// stays inert: it never connects and ignores every input. Otherwise the
    /// client is created, its events are wired to the host and a connection
    /// is attempted. A failed first connect is logged, not returned; the
    /// client reports it through its own events.
    pub async fn start<F>(
        settings: NodeSettings,
        config: Option<ClientConfig>,
        factory: &F,
        host: Arc<H>,
    ) -> Result<Self>
    where
        F: ClientFactory<Client = C>,
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let settings = Arc::new(settings);

        let Some(config) = config else {
            host.status(NodeStatus::NotConfigured).await;
            error!("{}", BridgeError::MissingConfigReference);
            return Ok(Self {
                settings,
                client: None,
                host,
                pump_handle: Mutex::new(None),
                shutdown_tx,
            });
        };

        host.status(NodeStatus::Initializing).await;
        let registry = Arc::new(EventRegistry::builtin()?);
        for event in &settings.events {
            if !registry.contains(event) {
                warn!("Ignoring unknown event selection: \"{event}\"");
            }
        }

        let client = match factory.initialize(config).await {
            Ok(client) => Arc::new(client),
            Err(e) => {
                host.status(NodeStatus::ConnectionError).await;
                return Err(e.into());
            }
        };

        // Subscribe before connecting so no lifecycle event is missed
        let events = client.subscribe();
        let pump = tokio::spawn(pump_events(
            events,
            Arc::clone(&host),
            registry,
            Arc::clone(&settings),
            shutdown_rx,
        ));

        host.status(NodeStatus::Initialized).await;
        info!("Eufy client initialized");

        let node = Self {
            settings,
            client: Some(client),
            host,
            pump_handle: Mutex::new(Some(pump)),
            shutdown_tx,
        };
        node.connect().await;
        Ok(node)
    }

    async fn connect(&self) {
        let Some(client) = &self.client else {
            return;
        };
        let connected = client.is_connected().await.unwrap_or_else(|e| {
            warn!("Could not query connection state: {e}");
            false
        });
        if connected {
            return;
        }

        self.host.status(NodeStatus::Connecting).await;
        match client.connect(None).await {
            Ok(_) => debug!("Connect request completed"),
            Err(e) => warn!("Connect failed: {e}"),
        }
    }

    /// Whether a client was created. An unconfigured node never is.
    pub fn is_initialized(&self) -> bool {
        self.client.is_some()
    }

    pub fn settings(&self) -> &NodeSettings {
        &self.settings
    }

    pub fn client(&self) -> Option<&Arc<C>> {
        self.client.as_ref()
    }

    /// Handle one inbound message: dispatch its command and send the result.
    ///
    /// Each call runs to completion independently; concurrent calls are
    /// neither queued nor coalesced.
    pub async fn handle_input(&self, message: InboundMessage) {
        let Some(client) = &self.client else {
            debug!("Ignoring input, node not initialized");
            return;
        };

        if let Some(result) = dispatch(client.as_ref(), &message.payload).await {
            self.host
                .send(OutboundMessage::command_result(self.settings.topic.clone(), result))
                .await;
        }
    }

    /// Close the client, then stop forwarding events.
    ///
    /// Events the client emits while closing are still handled, so the
    /// final status reaches the host.
    pub async fn stop(&self) {
        info!("Stopping node");
        if let Some(client) = &self.client
            && let Err(e) = client.close().await
        {
            warn!("Error closing client: {e}");
        }

        let _ = self.shutdown_tx.send(true);
        if let Some(h) = self.pump_handle.lock().await.take()
            && let Err(e) = h.await
            && !e.is_cancelled()
        {
            warn!("Event pump failed: {e}");
        }
    }
}

impl<C, H> Drop for SecurityNode<C, H>
where
    C: SecurityClient + 'static,
    H: Host + 'static,
{
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(h) = self.pump_handle.get_mut().take() {
            h.abort();
        }
    }
}

/// Status a client lifecycle event moves the node to, if any.
pub fn lifecycle_status(event: &str) -> Option<NodeStatus> {
    match event {
        EVENT_CONNECT => Some(NodeStatus::Connected),
        EVENT_CONNECTION_ERROR => Some(NodeStatus::ConnectionError),
        EVENT_TFA_REQUEST => Some(NodeStatus::AwaitingTfa),
        EVENT_CAPTCHA_REQUEST => Some(NodeStatus::AwaitingCaptcha),
        EVENT_CLOSE => Some(NodeStatus::Disconnected),
        _ => None,
    }
}

async fn pump_events<H: Host>(
    mut rx: EventReceiver,
    host: Arc<H>,
    registry: Arc<EventRegistry>,
    settings: Arc<NodeSettings>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            biased;
            received = rx.recv() => match received {
                Ok(event) => handle_client_event(event, host.as_ref(), &registry, &settings).await,
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Event receiver lagged, missed {n} events");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                    info!("Event channel closed");
                    break;
                }
            },
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    debug!("Event pump shutting down");
                    break;
                }
            }
        }
    }
}

/// `(id: ..., captcha: ...)` from the arguments of a captcha request.
fn captcha_prompt(args: &[ClientValue]) -> String {
    let arg = |i: usize| {
        args.get(i)
            .and_then(ClientValue::unwrap_properties)
            .map(|v| match v {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .unwrap_or_default()
    };
    format!("(id: {}, captcha: {})", arg(0), arg(1))
}

async fn handle_client_event<H: Host + ?Sized>(
    event: ClientEvent,
    host: &H,
    registry: &EventRegistry,
    settings: &NodeSettings,
) {
    let forwarded = settings.forwards(&event.name);

    if let Some(status) = lifecycle_status(&event.name) {
        match status {
            NodeStatus::Connected => info!("Client connected"),
            NodeStatus::Disconnected => warn!("Client disconnected"),
            NodeStatus::ConnectionError => error!("Client connection error"),
            NodeStatus::AwaitingTfa if !forwarded => {
                warn!("TFA request received, enter TFA code");
            }
            NodeStatus::AwaitingCaptcha if !forwarded => {
                warn!(
                    "Captcha request received, enter captcha {}",
                    captcha_prompt(&event.args)
                );
            }
            _ => {}
        }
        host.status(status).await;
    }

    if !forwarded {
        return;
    }
    if let Some(fields) = registry.transform(&event.name, &event.args) {
        debug!("Forwarding event \"{}\"", event.name);
        host.send(OutboundMessage::event(settings.topic.clone(), event.name, fields))
            .await;
    }
}
