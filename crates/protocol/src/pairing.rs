use serde::{Deserialize, Serialize};

use crate::{Identity, WireError};

/// The friendly-name payload of a private 1:1 channel.
///
/// Private channels carry their two participants as JSON inside the
/// provider's `friendlyName` display field — a deliberate encoding choice
/// to avoid extending the transport schema. Exact shape on the wire:
///
/// ```json
/// {"players":{"currentPlayer":{...},"otherPlayer":{...}}}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingName {
    pub players: PairingPlayers,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingPlayers {
    #[serde(rename = "currentPlayer")]
    pub current_player: Identity,
    #[serde(rename = "otherPlayer")]
    pub other_player: Identity,
}

impl PairingName {
    pub fn new(current_player: Identity, other_player: Identity) -> Self {
        Self {
            players: PairingPlayers {
                current_player,
                other_player,
            },
        }
    }

    /// Encode for use as a channel friendly name at creation time.
    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Total parse: `None` for anything that is not a pairing payload
    /// (town and help channels land here).
    pub fn parse(friendly_name: &str) -> Option<Self> {
        serde_json::from_str(friendly_name).ok()
    }

    /// Strict decode, surfacing the underlying serde error.
    pub fn decode(friendly_name: &str) -> Result<Self, WireError> {
        serde_json::from_str(friendly_name).map_err(WireError::Pairing)
    }

    /// Both paired identities, creation order.
    pub fn identities(&self) -> (&Identity, &Identity) {
        (&self.players.current_player, &self.players.other_player)
    }

    /// The party that is not `viewer`, by player id. Falls back to
    /// `other_player` when the viewer is not part of the pairing at all.
    pub fn counterpart(&self, viewer_player_id: &str) -> &Identity {
        if self.players.other_player.player_id == viewer_player_id {
            &self.players.current_player
        } else {
            &self.players.other_player
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PairingName {
        PairingName::new(Identity::new("p1", "Alice"), Identity::new("p2", "Bob"))
    }

    #[test]
    fn test_wire_shape_is_preserved() {
        let value: serde_json::Value = serde_json::from_str(&sample().encode()).unwrap();
        assert_eq!(value["players"]["currentPlayer"]["playerID"], "p1");
        assert_eq!(value["players"]["currentPlayer"]["userName"], "Alice");
        assert_eq!(value["players"]["otherPlayer"]["playerID"], "p2");
        assert_eq!(value["players"]["otherPlayer"]["userName"], "Bob");
    }

    #[test]
    fn test_parse_rejects_plain_names() {
        assert!(PairingName::parse("town-42").is_none());
        assert!(PairingName::parse("p1").is_none());
        assert!(PairingName::parse("{\"players\":{}}").is_none());
    }

    #[test]
    fn test_counterpart_is_viewer_relative() {
        let pairing = sample();
        assert_eq!(pairing.counterpart("p1").user_name, "Bob");
        assert_eq!(pairing.counterpart("p2").user_name, "Alice");
    }
}
