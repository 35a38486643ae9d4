//! HTTP and realtime WebSocket surface of the chat server.

pub mod handler;
mod runner;
mod signal;
pub mod state;

pub use runner::{router, run, serve};
