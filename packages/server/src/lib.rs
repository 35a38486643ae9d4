//! Studyhall chat server library.
//!
//! Message store, room directory, realtime change feeds and typing channels,
//! plus the `chat-messages` HTTP API for non-realtime clients.

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// Re-export entry points
pub use config::ServerConfig;
pub use ui::run as run_server;
