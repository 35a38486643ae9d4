//! InMemory Repository 実装

mod message;
mod profile;
mod room;
mod token;

pub use message::InMemoryMessageRepository;
pub use profile::InMemoryProfileRepository;
pub use room::InMemoryRoomRepository;
pub use token::InMemoryAccessTokenRepository;
