//! Data transfer objects shared by the server handlers and the remote client.

pub mod http;
pub mod realtime;
