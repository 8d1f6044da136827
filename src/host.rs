// MIT License - Copyright (c) 2026 Peter Wright
// Eufy Security bridge

use async_trait::async_trait;

use crate::message::OutboundMessage;
use crate::status::NodeStatus;

/// Where the node's output goes: routed messages and status updates.
#[async_trait]
pub trait Host: Send + Sync {
    async fn send(&self, message: OutboundMessage);

    async fn status(&self, status: NodeStatus);
}
