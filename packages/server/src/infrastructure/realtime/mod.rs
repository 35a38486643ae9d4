//! Realtime fan-out: per-room change feeds and typing broadcast channels.

pub mod hub;

pub use hub::{ConnectionId, RealtimeHub, TypingEnvelope};
