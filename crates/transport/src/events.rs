use plaza_protocol::{ChannelInfo, ChatMessage};

/// Events pushed by the provider to a connected client.
///
/// The orchestrator must be subscribed before its first channel operation:
/// an invite or message delivered in the unsubscribed window is silently
/// lost (the provider does not replay).
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// This client was invited to a channel.
    ChannelInvited(ChannelInfo),
    /// This client's membership on a channel ended.
    ChannelLeft { sid: String },
    /// A channel this client belonged to was deleted provider-side.
    ChannelRemoved { sid: String },
    /// A message arrived on a joined channel.
    MessageAdded { sid: String, message: ChatMessage },
    /// The session credential is about to expire.
    TokenExpiring,
}
