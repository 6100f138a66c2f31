//! Wire types shared across the plaza session stack.
//!
//! The transport provider has no native identity or private-channel concept,
//! so identities ride inside two opaque string fields: the message `author`
//! and the channel `friendlyName`. The JSON shapes here are load-bearing —
//! already-deployed channels were created with exactly these field names and
//! must keep parsing.

pub mod channel;
pub mod identity;
pub mod message;
pub mod pairing;

pub use {
    channel::{ChannelInfo, ChannelStatus},
    identity::{Identity, SYSTEM_AUTHOR, display_author},
    message::ChatMessage,
    pairing::PairingName,
};

/// Errors decoding identity metadata out of provider string fields.
///
/// Classification paths recover from these locally (fall back to Town /
/// the raw author string); only strict decode paths surface them.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("author field is not a serialized identity: {0}")]
    Author(serde_json::Error),
    #[error("friendly name is not a pairing payload: {0}")]
    Pairing(serde_json::Error),
}
