use serde::Serialize;

use {
    plaza_channels::ChannelKind,
    plaza_protocol::ChatMessage,
};

/// Events the orchestrator pushes to the presentation layer.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A message arrived on a joined channel.
    MessageAdded { sid: String, message: ChatMessage },
    /// The set of channels changed (tab list should re-render).
    ChannelsChanged,
    /// The focused channel went away; focus moved back to the town channel.
    FocusReset,
    /// The session credential was swapped for a fresh one.
    TokenRefreshed,
    /// The session is over; no automatic reconnection is attempted.
    Disconnected,
}

/// One tab in the presentation layer's channel list.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelView {
    pub sid: String,
    pub label: String,
    pub kind: ChannelKind,
}
