//! Per-session channel set and private-pairing rules.
//!
//! The registry owns join/dedup bookkeeping and the stable tab order; the
//! pairing engine only reads channel metadata — it classifies, derives
//! labels, and decides visibility, never mutating registry state.

pub mod pairing;
pub mod registry;

pub use {
    pairing::{ChannelKind, PairingMap, classify, is_visible, label},
    registry::ChannelRegistry,
};
