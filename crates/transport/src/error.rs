/// Transport-level failures.
///
/// `NotFound` is an expected control-flow signal: the orchestrator probes
/// for the town channel by unique name and decides between "join existing"
/// and "create new" based on it. It is never logged as an error.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("no channel with unique name '{0}'")]
    NotFound(String),
    #[error("connect failed: {0}")]
    Connect(String),
    #[error("join failed for channel {sid}: {reason}")]
    Join { sid: String, reason: String },
    #[error("leave failed for channel {sid}: {reason}")]
    Leave { sid: String, reason: String },
    #[error("send failed on channel {sid}: {reason}")]
    Send { sid: String, reason: String },
    #[error("history fetch failed on channel {sid}: {reason}")]
    History { sid: String, reason: String },
    #[error("channel creation failed: {0}")]
    Create(String),
}

impl TransportError {
    /// True when probing for a channel that simply does not exist yet.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
