//! Infrastructure layer: repository implementations, realtime fan-out, DTOs
//! and start-up seed data.

pub mod backend;
pub mod dto;
pub mod realtime;
pub mod repository;
pub mod seed;

pub use backend::InMemoryBackend;
