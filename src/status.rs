// MIT License - Copyright (c) 2026 Peter Wright
// Eufy Security bridge

use std::fmt;

use serde::Serialize;

/// Colour hint shown next to a status label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFill {
    Red,
    Grey,
    Yellow,
    Green,
}

/// Node state reported to the host UI. Not a data channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    NotConfigured,
    Initializing,
    Initialized,
    Connecting,
    Connected,
    ConnectionError,
    Disconnected,
    AwaitingTfa,
    AwaitingCaptcha,
}

impl NodeStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotConfigured => "Not configured",
            Self::Initializing => "Initializing",
            Self::Initialized => "Initialized",
            Self::Connecting => "Connecting",
            Self::Connected => "Connected",
            Self::ConnectionError => "Connection error",
            Self::Disconnected => "Disconnected",
            Self::AwaitingTfa => "Awaiting TFA",
            Self::AwaitingCaptcha => "Awaiting captcha",
        }
    }

    pub fn fill(&self) -> StatusFill {
        match self {
            Self::NotConfigured | Self::ConnectionError | Self::Disconnected => StatusFill::Red,
            Self::Initializing | Self::Initialized => StatusFill::Grey,
            Self::Connecting | Self::AwaitingTfa | Self::AwaitingCaptcha => StatusFill::Yellow,
            Self::Connected => StatusFill::Green,
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
