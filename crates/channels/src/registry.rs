use tracing::debug;

use plaza_protocol::ChannelInfo;

/// The per-session set of joined channels, keyed by provider sid.
///
/// Insertion order is the presentation tab order and is never reordered:
/// positions stay stable across the session lifetime except for
/// append/remove.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    channels: Vec<ChannelInfo>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent add, keyed by sid. Returns false when the channel was
    /// already present — a provider event and an explicit join resolving to
    /// the same channel converge to one entry, never a duplicate tab.
    pub fn add(&mut self, info: ChannelInfo) -> bool {
        if self.contains(&info.sid) {
            debug!(sid = %info.sid, "channel already registered, skipping");
            return false;
        }
        self.channels.push(info);
        true
    }

    pub fn remove(&mut self, sid: &str) -> Option<ChannelInfo> {
        let idx = self.channels.iter().position(|c| c.sid == sid)?;
        Some(self.channels.remove(idx))
    }

    pub fn contains(&self, sid: &str) -> bool {
        self.channels.iter().any(|c| c.sid == sid)
    }

    pub fn get(&self, sid: &str) -> Option<&ChannelInfo> {
        self.channels.iter().find(|c| c.sid == sid)
    }

    /// All channels in insertion order.
    pub fn list(&self) -> &[ChannelInfo] {
        &self.channels
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Drain every channel, oldest first (session teardown).
    pub fn drain(&mut self) -> Vec<ChannelInfo> {
        std::mem::take(&mut self.channels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plaza_protocol::ChannelStatus;

    fn channel(sid: &str) -> ChannelInfo {
        ChannelInfo {
            sid: sid.to_string(),
            unique_name: format!("u-{sid}"),
            friendly_name: format!("f-{sid}"),
            status: ChannelStatus::Joined,
        }
    }

    #[test]
    fn test_add_is_idempotent_by_sid() {
        let mut registry = ChannelRegistry::new();
        assert!(registry.add(channel("CH1")));
        // Same sid from a different source (e.g. provider event vs. explicit
        // join) must not produce a second entry.
        let mut dup = channel("CH1");
        dup.friendly_name = "different".to_string();
        assert!(!registry.add(dup));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_list_keeps_insertion_order_across_removal() {
        let mut registry = ChannelRegistry::new();
        registry.add(channel("CH1"));
        registry.add(channel("CH2"));
        registry.add(channel("CH3"));
        registry.remove("CH2");

        let sids: Vec<&str> = registry.list().iter().map(|c| c.sid.as_str()).collect();
        assert_eq!(sids, vec!["CH1", "CH3"]);

        registry.add(channel("CH4"));
        let sids: Vec<&str> = registry.list().iter().map(|c| c.sid.as_str()).collect();
        assert_eq!(sids, vec!["CH1", "CH3", "CH4"]);
    }

    #[test]
    fn test_remove_missing_is_none() {
        let mut registry = ChannelRegistry::new();
        assert!(registry.remove("CH9").is_none());
    }
}
