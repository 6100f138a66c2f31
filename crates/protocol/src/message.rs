use {
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
};

use crate::{Identity, SYSTEM_AUTHOR, identity::display_author};

/// A single message as delivered by the transport.
///
/// Ordering within a channel is the provider's delivery order; no
/// client-side reordering or deduplication happens anywhere in the stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sid: String,
    /// Raw author string: a serialized [`Identity`] for participant
    /// messages, `"system"` for join/leave notices and bot delivery.
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn is_system(&self) -> bool {
        self.author == SYSTEM_AUTHOR
    }

    /// Decoded author identity, `None` for system and malformed authors.
    pub fn author_identity(&self) -> Option<Identity> {
        Identity::from_author(&self.author).ok()
    }

    /// Display name for rendering and history export.
    pub fn author_display(&self) -> String {
        display_author(&self.author)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_messages_have_no_identity() {
        let msg = ChatMessage {
            sid: "m1".into(),
            author: SYSTEM_AUTHOR.into(),
            body: "Alice has joined the main chat".into(),
            created_at: Utc::now(),
        };
        assert!(msg.is_system());
        assert!(msg.author_identity().is_none());
        assert_eq!(msg.author_display(), "system");
    }

    #[test]
    fn test_participant_author_decodes() {
        let msg = ChatMessage {
            sid: "m2".into(),
            author: Identity::new("p1", "Alice").to_author(),
            body: "hello".into(),
            created_at: Utc::now(),
        };
        assert!(!msg.is_system());
        assert_eq!(msg.author_identity().unwrap().player_id, "p1");
        assert_eq!(msg.author_display(), "Alice");
    }
}
