//! Transport client adapter: the only layer that talks to the message
//! provider.
//!
//! The provider is assumed reliable once connected; everything here is a
//! thin typed facade over its connect/join/leave/send/history primitives
//! plus the event surface the orchestrator consumes. `memory` hosts a
//! process-local provider used by tests and the demo CLI.

pub mod client;
pub mod error;
pub mod events;
pub mod memory;

pub use {
    client::{ChannelVisibility, ChatTransport, Connection, leave_with_farewell},
    error::TransportError,
    events::TransportEvent,
};
