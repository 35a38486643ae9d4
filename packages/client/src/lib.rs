//! Studyhall realtime chat client.
//!
//! The room session core (history loading, live message subscription,
//! typing presence and the room session controller) is written against
//! the ports in [`port`]; [`infrastructure`] provides an in-process adapter
//! and a remote HTTP/WebSocket adapter.

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod port;
pub mod session;
pub mod ui;

pub use config::ClientConfig;
pub use error::ChatError;
pub use session::{RoomSessionController, SessionPhase, SessionUpdate};
pub use ui::run as run_client;
