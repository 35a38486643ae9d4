//! Port adapters.
//!
//! - [`LocalBackend`]: in-process, talks to a server's application state directly
//! - [`RemoteBackend`]: HTTP companion API plus realtime WebSocket endpoints

pub mod local;
pub mod remote;

pub use local::LocalBackend;
pub use remote::RemoteBackend;
