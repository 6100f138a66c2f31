use {anyhow::Result, async_trait::async_trait, tracing::debug};

use {
    plaza_protocol::{Identity, PairingName},
    plaza_transport::{ChannelVisibility, memory::InMemoryChat},
};

/// The external administrative API that creates private and bot channels
/// server-side. The orchestrator never creates these directly — it only
/// joins channels so created, which arrive as invites.
#[async_trait]
pub trait ChannelAdmin: Send + Sync {
    /// Create a private channel pairing `current` with `other` and invite
    /// both.
    async fn create_private_channel(
        &self,
        current: &Identity,
        other: &Identity,
        town_id: &str,
    ) -> Result<()>;

    /// Create a bot-assisted help channel for `player` and invite them.
    async fn create_bot_channel(&self, player: &Identity, town_id: &str) -> Result<()>;
}

/// Admin collaborator backed by the in-memory provider, for tests and the
/// demo. Mirrors the server-side behavior: the private channel carries the
/// pairing payload as its friendly name; the help channel's friendly name
/// is the requesting player's id and its first message is the bot greeting.
pub struct InMemoryAdmin {
    chat: InMemoryChat,
    greeting: String,
    // Unique names are provider-unique forever, so re-opening a channel to
    // the same party needs a fresh suffix.
    serial: std::sync::atomic::AtomicUsize,
}

impl InMemoryAdmin {
    pub fn new(chat: InMemoryChat) -> Self {
        Self {
            chat,
            greeting: "Hi! How can I help you today?".to_string(),
            serial: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    fn next_serial(&self) -> usize {
        self.serial
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst)
    }
}

#[async_trait]
impl ChannelAdmin for InMemoryAdmin {
    async fn create_private_channel(
        &self,
        current: &Identity,
        other: &Identity,
        town_id: &str,
    ) -> Result<()> {
        let friendly = PairingName::new(current.clone(), other.clone()).encode();
        let unique = format!(
            "pm-{town_id}-{}-{}-{}",
            current.player_id,
            other.player_id,
            self.next_serial()
        );
        let info = self
            .chat
            .create_channel(&friendly, &unique, ChannelVisibility::Private)?;
        self.chat.invite(&info.sid, &current.player_id)?;
        self.chat.invite(&info.sid, &other.player_id)?;
        debug!(sid = %info.sid, "private channel created, both parties invited");
        Ok(())
    }

    async fn create_bot_channel(&self, player: &Identity, town_id: &str) -> Result<()> {
        let unique = format!("help-{town_id}-{}-{}", player.player_id, self.next_serial());
        let info = self
            .chat
            .create_channel(&player.player_id, &unique, ChannelVisibility::Private)?;
        // Greeting goes in first so it is the channel's opening message.
        self.chat.post_system_message(&info.sid, &self.greeting);
        self.chat.invite(&info.sid, &player.player_id)?;
        debug!(sid = %info.sid, player_id = %player.player_id, "help channel created");
        Ok(())
    }
}
