//! Domain layer for the chat application.
//!
//! This module contains business logic that is independent of
//! data transfer objects (DTOs) and infrastructure concerns.

pub mod entity;
pub mod error;
pub mod factory;
pub mod repository;
pub mod value_object;

pub use entity::{
    ChatMessage, DEFAULT_HISTORY_LIMIT, MessageWithSender, Profile, Room, TypingAnnouncement,
    UNKNOWN_SENDER_NAME,
};
pub use error::{RepositoryError, ValueObjectError};
pub use factory::MessageIdFactory;
pub use repository::{
    AccessTokenRepository, MessageRepository, ProfileRepository, RoomRepository,
};
pub use value_object::{DisplayName, MessageId, MessageText, RoomId, Timestamp, UserId};
