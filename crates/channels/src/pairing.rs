use std::collections::{HashMap, HashSet};

use serde::Serialize;

use plaza_protocol::{ChannelInfo, Identity, PairingName};

/// Derived channel role within a session. Never stored — always re-derived
/// from the friendly name so provider-side renames take effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    /// The single shared broadcast channel for the town.
    Town,
    /// Bot-assisted help conversation.
    Help,
    /// Two-party private channel.
    Private(PairingName),
}

/// Classify a channel from its friendly-name metadata.
///
/// Tagged-variant decode with fallback: a friendly name that parses as a
/// pairing payload is Private; one equal to the viewer's player id is the
/// viewer's help channel; everything else, including malformed metadata,
/// is the town broadcast.
pub fn classify(info: &ChannelInfo, viewer: &Identity) -> ChannelKind {
    if let Some(pairing) = PairingName::parse(&info.friendly_name) {
        return ChannelKind::Private(pairing);
    }
    if info.friendly_name == viewer.player_id {
        return ChannelKind::Help;
    }
    ChannelKind::Town
}

/// A private channel stays visible only while both paired identities are in
/// the live roster. Evaluated on every call, never cached: a stale pairing
/// disappears from view even though the channel object still exists until
/// it is explicitly left.
pub fn is_visible(pairing: &PairingName, roster: &HashSet<String>) -> bool {
    let (a, b) = pairing.identities();
    roster.contains(&a.player_id) && roster.contains(&b.player_id)
}

/// Tab label relative to the viewer: the other party's display name.
pub fn label(pairing: &PairingName, viewer: &Identity) -> String {
    pairing.counterpart(&viewer.player_id).user_name.clone()
}

// ── Pairing map ──────────────────────────────────────────────────────────────

/// Active private pairings, keyed by channel sid.
///
/// Tracks which players the session identity already has an open private
/// channel with, so a second channel to the same player is rejected and a
/// leave releases both parties at once.
#[derive(Debug, Default)]
pub struct PairingMap {
    by_sid: HashMap<String, (String, String)>,
}

impl PairingMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, sid: impl Into<String>, a: impl Into<String>, b: impl Into<String>) {
        self.by_sid.insert(sid.into(), (a.into(), b.into()));
    }

    /// Remove the pairing for a channel, releasing both identities.
    pub fn remove(&mut self, sid: &str) -> Option<(String, String)> {
        self.by_sid.remove(sid)
    }

    /// Whether this player already has an open private channel.
    pub fn is_engaged(&self, player_id: &str) -> bool {
        self.by_sid
            .values()
            .any(|(a, b)| a == player_id || b == player_id)
    }

    /// The sid of the pairing this player participates in, if any.
    pub fn sid_for(&self, player_id: &str) -> Option<&str> {
        self.by_sid
            .iter()
            .find(|(_, (a, b))| a == player_id || b == player_id)
            .map(|(sid, _)| sid.as_str())
    }

    pub fn contains(&self, sid: &str) -> bool {
        self.by_sid.contains_key(sid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plaza_protocol::ChannelStatus;

    fn alice() -> Identity {
        Identity::new("p1", "Alice")
    }

    fn bob() -> Identity {
        Identity::new("p2", "Bob")
    }

    fn channel(friendly_name: &str) -> ChannelInfo {
        ChannelInfo {
            sid: "CH1".to_string(),
            unique_name: "u1".to_string(),
            friendly_name: friendly_name.to_string(),
            status: ChannelStatus::Joined,
        }
    }

    #[test]
    fn test_classify_round_trip() {
        let friendly = PairingName::new(alice(), bob()).encode();
        let kind = classify(&channel(&friendly), &alice());
        let ChannelKind::Private(pairing) = kind else {
            panic!("expected private classification");
        };
        assert_eq!(pairing.identities().0.player_id, "p1");
        assert_eq!(pairing.identities().1.player_id, "p2");
        assert_eq!(label(&pairing, &alice()), "Bob");
        assert_eq!(label(&pairing, &bob()), "Alice");
    }

    #[test]
    fn test_classify_help_by_viewer_player_id() {
        assert_eq!(classify(&channel("p1"), &alice()), ChannelKind::Help);
        // Someone else's help channel is not ours; it falls through to Town.
        assert_eq!(classify(&channel("p2"), &alice()), ChannelKind::Town);
    }

    #[test]
    fn test_classify_malformed_metadata_falls_back_to_town() {
        assert_eq!(
            classify(&channel("{\"players\":"), &alice()),
            ChannelKind::Town
        );
        assert_eq!(classify(&channel("Friendly Town"), &alice()), ChannelKind::Town);
    }

    #[test]
    fn test_visibility_requires_both_parties() {
        let pairing = PairingName::new(alice(), bob());
        let mut roster: HashSet<String> = ["p1", "p2", "p3"].iter().map(|s| s.to_string()).collect();
        assert!(is_visible(&pairing, &roster));

        roster.remove("p2");
        assert!(!is_visible(&pairing, &roster));

        roster.remove("p1");
        assert!(!is_visible(&pairing, &roster));
    }

    #[test]
    fn test_pairing_map_releases_both_on_remove() {
        let mut map = PairingMap::new();
        map.insert("CH1", "p1", "p2");
        assert!(map.is_engaged("p1"));
        assert!(map.is_engaged("p2"));
        assert_eq!(map.sid_for("p2"), Some("CH1"));

        map.remove("CH1");
        assert!(!map.is_engaged("p1"));
        assert!(!map.is_engaged("p2"));
    }
}
