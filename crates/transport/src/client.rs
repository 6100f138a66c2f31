use {async_trait::async_trait, tokio::sync::mpsc, tracing::warn};

use {
    plaza_auth::Credential,
    plaza_protocol::{ChannelInfo, ChatMessage, Identity},
};

use crate::{error::TransportError, events::TransportEvent};

/// Channel visibility at creation time. Town channels are public; private
/// and bot channels are created private so they never show up in channel
/// listings of non-members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelVisibility {
    Public,
    Private,
}

/// A messaging provider the session can connect to.
///
/// The identity travels alongside the credential because the token is
/// opaque to this layer; real providers embed it in the token grant.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn connect(
        &self,
        credential: &Credential,
        identity: &Identity,
    ) -> Result<Box<dyn Connection>, TransportError>;
}

/// An established, authenticated provider connection.
#[async_trait]
pub trait Connection: Send + Sync {
    fn identity(&self) -> &Identity;

    /// Register for provider events. Only events arriving after this call
    /// are delivered.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<TransportEvent>;

    async fn channel_by_unique_name(
        &self,
        unique_name: &str,
    ) -> Result<ChannelInfo, TransportError>;

    async fn create_channel(
        &self,
        friendly_name: &str,
        unique_name: &str,
        visibility: ChannelVisibility,
    ) -> Result<ChannelInfo, TransportError>;

    async fn join(&self, sid: &str) -> Result<ChannelInfo, TransportError>;

    async fn leave(&self, sid: &str) -> Result<(), TransportError>;

    async fn send_message(&self, sid: &str, body: &str) -> Result<(), TransportError>;

    /// Full history in provider delivery order.
    async fn message_history(&self, sid: &str) -> Result<Vec<ChatMessage>, TransportError>;
}

/// Send a farewell then leave.
///
/// The farewell is best-effort: a failed send is logged and swallowed so
/// the leave still runs. Leaving is not cancellable once initiated.
pub async fn leave_with_farewell(
    conn: &dyn Connection,
    sid: &str,
    farewell: &str,
) -> Result<(), TransportError> {
    if let Err(e) = conn.send_message(sid, farewell).await {
        warn!(sid, error = %e, "farewell send failed, leaving anyway");
    }
    conn.leave(sid).await
}
