//! Session orchestration: one user's view over a town's channels.
//!
//! Lifecycle:
//! 1. Acquire the session credential (terminal on failure)
//! 2. Connect to the transport, subscribe to events *before* any channel op
//! 3. Bootstrap the town channel (find-or-create, join, announce) — once
//! 4. Steady state: invites, removals, messages, token refresh, user ops
//! 5. Disconnect: best-effort farewell, leave everything, no reconnection
//!
//! Channel bookkeeping and pairing rules live in `plaza-channels`; this
//! crate drives them from discrete transport events.

pub mod admin;
pub mod events;
pub mod orchestrator;

pub use plaza_channels::ChannelKind;
pub use {
    admin::{ChannelAdmin, InMemoryAdmin},
    events::{ChannelView, SessionEvent},
    orchestrator::{SessionState, TownSession},
};
