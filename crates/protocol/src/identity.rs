use serde::{Deserialize, Serialize};

use crate::WireError;

/// Author value the provider stamps on join/leave notices and bot traffic.
pub const SYSTEM_AUTHOR: &str = "system";

/// A participant in a town session.
///
/// Serialized with the exact field names deployed channels were created
/// with (`playerID` / `userName`); do not rename.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    #[serde(rename = "playerID")]
    pub player_id: String,
    #[serde(rename = "userName")]
    pub user_name: String,
}

impl Identity {
    pub fn new(player_id: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            player_id: player_id.into(),
            user_name: user_name.into(),
        }
    }

    /// Serialize this identity into a provider `author` string.
    pub fn to_author(&self) -> String {
        // Identity has no non-string fields, so serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Strictly decode a provider `author` string back into an identity.
    pub fn from_author(author: &str) -> Result<Self, WireError> {
        serde_json::from_str(author).map_err(WireError::Author)
    }
}

/// Resolve the display name for a raw `author` string.
///
/// Non-system authors are serialized identities; anything that fails to
/// decode (including the `"system"` sentinel) renders as-is.
pub fn display_author(author: &str) -> String {
    match Identity::from_author(author) {
        Ok(identity) => identity.user_name,
        Err(_) => author.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_round_trip() {
        let alice = Identity::new("p1", "Alice");
        let author = alice.to_author();
        assert_eq!(Identity::from_author(&author).unwrap(), alice);
    }

    #[test]
    fn test_author_wire_field_names() {
        let author = Identity::new("p1", "Alice").to_author();
        let value: serde_json::Value = serde_json::from_str(&author).unwrap();
        assert_eq!(value["playerID"], "p1");
        assert_eq!(value["userName"], "Alice");
    }

    #[test]
    fn test_display_author_falls_back_to_raw_string() {
        assert_eq!(display_author(SYSTEM_AUTHOR), "system");
        assert_eq!(display_author("not json"), "not json");
        let author = Identity::new("p2", "Bob").to_author();
        assert_eq!(display_author(&author), "Bob");
    }
}
