// MIT License - Copyright (c) 2026 Peter Wright
// Eufy Security bridge

use crate::value::ClientValue;

/// An event raised by the client: its name plus the positional arguments
/// it was emitted with.
///
/// Users subscribe via `client.subscribe()` to receive a
/// `tokio::sync::broadcast::Receiver<ClientEvent>`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientEvent {
    pub name: String,
    pub args: Vec<ClientValue>,
}

impl ClientEvent {
    pub fn new(name: impl Into<String>, args: Vec<ClientValue>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// An event without arguments (`connect`, `close`, `tfa request`, ...).
    pub fn bare(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }
}

/// Type alias for the broadcast sender.
pub type EventSender = tokio::sync::broadcast::Sender<ClientEvent>;

/// Type alias for the broadcast receiver.
pub type EventReceiver = tokio::sync::broadcast::Receiver<ClientEvent>;

/// Create a new event channel with the given capacity.
pub fn event_channel(capacity: usize) -> (EventSender, EventReceiver) {
    tokio::sync::broadcast::channel(capacity)
}
