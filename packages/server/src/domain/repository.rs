//! Repository traits.
//!
//! The domain layer defines the data-access contracts; the infrastructure
//! layer provides the implementations (dependency inversion).

use async_trait::async_trait;

use super::{
    entity::{ChatMessage, Profile, Room},
    error::RepositoryError,
    value_object::{MessageText, RoomId, UserId},
};

/// Room directory access
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// List every room, oldest first
    async fn list_rooms(&self) -> Result<Vec<Room>, RepositoryError>;

    /// Look up a single room
    async fn find_room(&self, room_id: &RoomId) -> Result<Option<Room>, RepositoryError>;
}

/// Message table access
///
/// Implementations assign the message id and creation time, and publish
/// every inserted row to the room's change feed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// The most recent `limit` messages of a room, ordered oldest first
    async fn recent_messages(
        &self,
        room_id: &RoomId,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, RepositoryError>;

    /// Append a message to a room
    async fn insert_message(
        &self,
        room_id: RoomId,
        user_id: UserId,
        message: MessageText,
    ) -> Result<ChatMessage, RepositoryError>;
}

/// Profile table access
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_profile(&self, user_id: &UserId) -> Result<Option<Profile>, RepositoryError>;
}

/// Bearer token lookup
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccessTokenRepository: Send + Sync {
    /// Resolve a bearer token to the user it was issued to
    async fn resolve_token(&self, token: &str) -> Result<Option<UserId>, RepositoryError>;
}
