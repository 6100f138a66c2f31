//! Process-local provider used by tests and the demo CLI.
//!
//! One `InMemoryChat` is the whole provider: channels live in a shared map,
//! each connected player has its own event queue, and the admin surface
//! (channel creation, invites, bot posts) mirrors what the external
//! administrative API does server-side for the real provider.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use {async_trait::async_trait, chrono::Utc, tokio::sync::mpsc, tracing::debug, uuid::Uuid};

use {
    plaza_auth::Credential,
    plaza_protocol::{ChannelInfo, ChannelStatus, ChatMessage, Identity, SYSTEM_AUTHOR},
};

use crate::{
    client::{ChannelVisibility, ChatTransport, Connection},
    error::TransportError,
    events::TransportEvent,
};

struct MemChannel {
    sid: String,
    unique_name: String,
    friendly_name: String,
    visibility: ChannelVisibility,
    members: HashSet<String>,
    invited: HashSet<String>,
    messages: Vec<ChatMessage>,
}

impl MemChannel {
    fn info_for(&self, player_id: &str) -> ChannelInfo {
        let status = if self.members.contains(player_id) {
            ChannelStatus::Joined
        } else if self.invited.contains(player_id) {
            ChannelStatus::Invited
        } else {
            ChannelStatus::Left
        };
        ChannelInfo {
            sid: self.sid.clone(),
            unique_name: self.unique_name.clone(),
            friendly_name: self.friendly_name.clone(),
            status,
        }
    }
}

#[derive(Default)]
struct ChatCore {
    channels: HashMap<String, MemChannel>,
    by_unique: HashMap<String, String>,
    subscribers: HashMap<String, Vec<mpsc::UnboundedSender<TransportEvent>>>,
    failing_sends: HashSet<String>,
}

impl ChatCore {
    fn emit_to(&mut self, player_id: &str, event: &TransportEvent) {
        if let Some(subs) = self.subscribers.get_mut(player_id) {
            subs.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }

    fn append_message(&mut self, sid: &str, author: String, body: &str) {
        let Some(channel) = self.channels.get_mut(sid) else {
            return;
        };
        let message = ChatMessage {
            sid: Uuid::new_v4().to_string(),
            author,
            body: body.to_string(),
            created_at: Utc::now(),
        };
        channel.messages.push(message.clone());
        let members: Vec<String> = channel.members.iter().cloned().collect();
        for player_id in members {
            self.emit_to(
                &player_id,
                &TransportEvent::MessageAdded {
                    sid: sid.to_string(),
                    message: message.clone(),
                },
            );
        }
    }

    fn create(
        &mut self,
        friendly_name: &str,
        unique_name: &str,
        visibility: ChannelVisibility,
    ) -> Result<String, TransportError> {
        if self.by_unique.contains_key(unique_name) {
            return Err(TransportError::Create(format!(
                "unique name '{unique_name}' already taken"
            )));
        }
        let sid = format!("CH{}", Uuid::new_v4().simple());
        self.channels.insert(sid.clone(), MemChannel {
            sid: sid.clone(),
            unique_name: unique_name.to_string(),
            friendly_name: friendly_name.to_string(),
            visibility,
            members: HashSet::new(),
            invited: HashSet::new(),
            messages: Vec::new(),
        });
        self.by_unique.insert(unique_name.to_string(), sid.clone());
        Ok(sid)
    }
}

// ── Provider handle ──────────────────────────────────────────────────────────

/// The shared provider. Clone freely; all handles see the same channels.
#[derive(Clone, Default)]
pub struct InMemoryChat {
    core: Arc<Mutex<ChatCore>>,
}

impl InMemoryChat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Server-side channel creation (the administrative API path).
    pub fn create_channel(
        &self,
        friendly_name: &str,
        unique_name: &str,
        visibility: ChannelVisibility,
    ) -> Result<ChannelInfo, TransportError> {
        let mut core = self.core.lock().unwrap();
        let sid = core.create(friendly_name, unique_name, visibility)?;
        debug!(sid, unique_name, "channel created (admin)");
        Ok(core.channels[&sid].info_for(""))
    }

    /// Invite a player; delivers `ChannelInvited` to their event queue.
    pub fn invite(&self, sid: &str, player_id: &str) -> Result<(), TransportError> {
        let mut core = self.core.lock().unwrap();
        let info = {
            let channel = core
                .channels
                .get_mut(sid)
                .ok_or_else(|| TransportError::NotFound(sid.to_string()))?;
            channel.invited.insert(player_id.to_string());
            channel.info_for(player_id)
        };
        core.emit_to(player_id, &TransportEvent::ChannelInvited(info));
        Ok(())
    }

    /// Post a message authored by the system sentinel (bot delivery,
    /// server-side notices).
    pub fn post_system_message(&self, sid: &str, body: &str) {
        let mut core = self.core.lock().unwrap();
        core.append_message(sid, SYSTEM_AUTHOR.to_string(), body);
    }

    /// Delete a channel provider-side, notifying all members.
    pub fn remove_channel(&self, sid: &str) {
        let mut core = self.core.lock().unwrap();
        if let Some(channel) = core.channels.remove(sid) {
            core.by_unique.remove(&channel.unique_name);
            for player_id in channel.members {
                core.emit_to(&player_id, &TransportEvent::ChannelRemoved {
                    sid: sid.to_string(),
                });
            }
        }
    }

    /// Fault injection: make every send on `sid` fail.
    pub fn fail_sends_on(&self, sid: &str) {
        self.core
            .lock()
            .unwrap()
            .failing_sends
            .insert(sid.to_string());
    }

    /// Signal imminent credential expiry to one player.
    pub fn emit_token_expiring(&self, player_id: &str) {
        self.core
            .lock()
            .unwrap()
            .emit_to(player_id, &TransportEvent::TokenExpiring);
    }

    /// Joined member player ids, for assertions.
    pub fn members(&self, sid: &str) -> Vec<String> {
        self.core
            .lock()
            .unwrap()
            .channels
            .get(sid)
            .map(|c| c.members.iter().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatTransport for InMemoryChat {
    async fn connect(
        &self,
        credential: &Credential,
        identity: &Identity,
    ) -> Result<Box<dyn Connection>, TransportError> {
        if credential.token().is_empty() {
            return Err(TransportError::Connect("empty credential".to_string()));
        }
        debug!(player_id = %identity.player_id, "connected to in-memory provider");
        Ok(Box::new(MemoryConnection {
            core: Arc::clone(&self.core),
            identity: identity.clone(),
        }))
    }
}

// ── Connection ───────────────────────────────────────────────────────────────

struct MemoryConnection {
    core: Arc<Mutex<ChatCore>>,
    identity: Identity,
}

#[async_trait]
impl Connection for MemoryConnection {
    fn identity(&self) -> &Identity {
        &self.identity
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<TransportEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.core
            .lock()
            .unwrap()
            .subscribers
            .entry(self.identity.player_id.clone())
            .or_default()
            .push(tx);
        rx
    }

    async fn channel_by_unique_name(
        &self,
        unique_name: &str,
    ) -> Result<ChannelInfo, TransportError> {
        let core = self.core.lock().unwrap();
        let sid = core
            .by_unique
            .get(unique_name)
            .ok_or_else(|| TransportError::NotFound(unique_name.to_string()))?;
        Ok(core.channels[sid].info_for(&self.identity.player_id))
    }

    async fn create_channel(
        &self,
        friendly_name: &str,
        unique_name: &str,
        visibility: ChannelVisibility,
    ) -> Result<ChannelInfo, TransportError> {
        let mut core = self.core.lock().unwrap();
        let sid = core.create(friendly_name, unique_name, visibility)?;
        Ok(core.channels[&sid].info_for(&self.identity.player_id))
    }

    async fn join(&self, sid: &str) -> Result<ChannelInfo, TransportError> {
        let mut core = self.core.lock().unwrap();
        let player_id = self.identity.player_id.clone();
        let channel = core
            .channels
            .get_mut(sid)
            .ok_or_else(|| TransportError::Join {
                sid: sid.to_string(),
                reason: "channel does not exist".to_string(),
            })?;
        if channel.visibility == ChannelVisibility::Private
            && !channel.invited.contains(&player_id)
            && !channel.members.contains(&player_id)
        {
            return Err(TransportError::Join {
                sid: sid.to_string(),
                reason: "private channel requires an invite".to_string(),
            });
        }
        channel.invited.remove(&player_id);
        channel.members.insert(player_id.clone());
        Ok(channel.info_for(&player_id))
    }

    async fn leave(&self, sid: &str) -> Result<(), TransportError> {
        let mut core = self.core.lock().unwrap();
        let player_id = self.identity.player_id.clone();
        let channel = core
            .channels
            .get_mut(sid)
            .ok_or_else(|| TransportError::Leave {
                sid: sid.to_string(),
                reason: "channel does not exist".to_string(),
            })?;
        channel.members.remove(&player_id);
        core.emit_to(&player_id, &TransportEvent::ChannelLeft {
            sid: sid.to_string(),
        });
        Ok(())
    }

    async fn send_message(&self, sid: &str, body: &str) -> Result<(), TransportError> {
        let mut core = self.core.lock().unwrap();
        if core.failing_sends.contains(sid) {
            return Err(TransportError::Send {
                sid: sid.to_string(),
                reason: "injected send failure".to_string(),
            });
        }
        if !core
            .channels
            .get(sid)
            .is_some_and(|c| c.members.contains(&self.identity.player_id))
        {
            return Err(TransportError::Send {
                sid: sid.to_string(),
                reason: "not a member".to_string(),
            });
        }
        core.append_message(sid, self.identity.to_author(), body);
        Ok(())
    }

    async fn message_history(&self, sid: &str) -> Result<Vec<ChatMessage>, TransportError> {
        let core = self.core.lock().unwrap();
        let channel = core
            .channels
            .get(sid)
            .ok_or_else(|| TransportError::History {
                sid: sid.to_string(),
                reason: "channel does not exist".to_string(),
            })?;
        Ok(channel.messages.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::leave_with_farewell;

    fn alice() -> Identity {
        Identity::new("p1", "Alice")
    }

    fn bob() -> Identity {
        Identity::new("p2", "Bob")
    }

    async fn connect(chat: &InMemoryChat, who: &Identity) -> Box<dyn Connection> {
        chat.connect(&Credential::new("tok", 3600), who)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_lookup_by_unique_name_signals_not_found() {
        let chat = InMemoryChat::new();
        let conn = connect(&chat, &alice()).await;
        let err = conn.channel_by_unique_name("town-42").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_message_fan_out_in_delivery_order() {
        let chat = InMemoryChat::new();
        let a = connect(&chat, &alice()).await;
        let b = connect(&chat, &bob()).await;
        let mut b_events = b.subscribe();

        let town = a
            .create_channel("Town", "town-42", ChannelVisibility::Public)
            .await
            .unwrap();
        a.join(&town.sid).await.unwrap();
        b.join(&town.sid).await.unwrap();

        a.send_message(&town.sid, "one").await.unwrap();
        a.send_message(&town.sid, "two").await.unwrap();

        let history = b.message_history(&town.sid).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].body, "one");
        assert_eq!(history[1].body, "two");

        let TransportEvent::MessageAdded { message, .. } = b_events.try_recv().unwrap() else {
            panic!("expected MessageAdded");
        };
        assert_eq!(message.body, "one");
    }

    #[tokio::test]
    async fn test_private_channel_requires_invite() {
        let chat = InMemoryChat::new();
        let info = chat
            .create_channel("secret", "pm-1", ChannelVisibility::Private)
            .unwrap();
        let b = connect(&chat, &bob()).await;
        assert!(b.join(&info.sid).await.is_err());

        chat.invite(&info.sid, "p2").unwrap();
        let joined = b.join(&info.sid).await.unwrap();
        assert_eq!(joined.status, ChannelStatus::Joined);
    }

    #[tokio::test]
    async fn test_invite_reaches_subscribed_player_only_after_subscribe() {
        let chat = InMemoryChat::new();
        let b = connect(&chat, &bob()).await;
        let info = chat
            .create_channel("secret", "pm-2", ChannelVisibility::Private)
            .unwrap();

        // Not subscribed yet: this invite is lost, per provider contract.
        chat.invite(&info.sid, "p2").unwrap();
        let mut events = b.subscribe();
        assert!(events.try_recv().is_err());

        chat.invite(&info.sid, "p2").unwrap();
        assert!(matches!(
            events.try_recv().unwrap(),
            TransportEvent::ChannelInvited(_)
        ));
    }

    #[tokio::test]
    async fn test_farewell_failure_does_not_block_leave() {
        let chat = InMemoryChat::new();
        let a = connect(&chat, &alice()).await;
        let town = a
            .create_channel("Town", "town-42", ChannelVisibility::Public)
            .await
            .unwrap();
        a.join(&town.sid).await.unwrap();

        chat.fail_sends_on(&town.sid);
        leave_with_farewell(a.as_ref(), &town.sid, "Alice has left the chat.")
            .await
            .unwrap();
        assert!(chat.members(&town.sid).is_empty());
    }
}
