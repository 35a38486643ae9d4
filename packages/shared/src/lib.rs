//! Shared utilities for the Studyhall server and client.

pub mod logger;
pub mod time;
