use serde::{Deserialize, Serialize};

/// Membership status of the session identity on a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelStatus {
    Joined,
    Invited,
    Left,
}

/// Provider-assigned channel snapshot.
///
/// `sid` is the provider's unique identifier and the registry key;
/// `unique_name` is the caller-chosen lookup name (the town id for the
/// shared channel); `friendly_name` is the display field that doubles as
/// metadata carrier for private and help channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub sid: String,
    pub unique_name: String,
    pub friendly_name: String,
    pub status: ChannelStatus,
}

impl ChannelInfo {
    pub fn is_joined(&self) -> bool {
        self.status == ChannelStatus::Joined
    }
}
