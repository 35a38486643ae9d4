//! Core domain models for the chat application.

use serde::{Deserialize, Serialize};

use super::value_object::{DisplayName, MessageId, MessageText, RoomId, Timestamp, UserId};

/// Sender name shown when a profile cannot be resolved
pub const UNKNOWN_SENDER_NAME: &str = "Unknown";

/// Default number of messages returned by a history query
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// A chat room listed in the room directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Room identifier
    pub id: RoomId,
    /// Display name of the room
    pub name: String,
    /// Short description shown in the directory
    pub description: String,
    /// Timestamp when the room was created
    pub created_at: Timestamp,
}

impl Room {
    pub fn new(id: RoomId, name: String, description: String, created_at: Timestamp) -> Self {
        Self {
            id,
            name,
            description,
            created_at,
        }
    }
}

/// A user's public profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    pub name: DisplayName,
}

impl Profile {
    pub fn new(id: UserId, name: DisplayName) -> Self {
        Self { id, name }
    }
}

/// A persisted chat message row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Store-assigned message identifier
    pub id: MessageId,
    /// Room the message belongs to
    pub room_id: RoomId,
    /// Sender's user ID
    pub user_id: UserId,
    /// Message body
    pub message: MessageText,
    /// Store-assigned creation time
    pub created_at: Timestamp,
}

impl ChatMessage {
    /// Create a new chat message
    pub fn new(
        id: MessageId,
        room_id: RoomId,
        user_id: UserId,
        message: MessageText,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            room_id,
            user_id,
            message,
            created_at,
        }
    }

    /// Ordering key used for every displayed message list.
    pub fn order_key(&self) -> (Timestamp, MessageId) {
        (self.created_at, self.id)
    }
}

/// A message joined with its sender's display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageWithSender {
    pub message: ChatMessage,
    /// `None` when the sender's profile no longer exists
    pub sender_name: Option<DisplayName>,
}

impl MessageWithSender {
    pub fn new(message: ChatMessage, sender_name: Option<DisplayName>) -> Self {
        Self {
            message,
            sender_name,
        }
    }

    /// Sender name with the `"Unknown"` fallback applied.
    pub fn sender_name_or_unknown(&self) -> &str {
        self.sender_name
            .as_ref()
            .map(DisplayName::as_str)
            .unwrap_or(UNKNOWN_SENDER_NAME)
    }
}

/// Ephemeral "user is typing" announcement. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingAnnouncement {
    pub user_id: UserId,
    pub name: DisplayName,
    pub room_id: RoomId,
}

impl TypingAnnouncement {
    pub fn new(user_id: UserId, name: DisplayName, room_id: RoomId) -> Self {
        Self {
            user_id,
            name,
            room_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::factory::MessageIdFactory;

    fn sample_message(created_at: i64) -> ChatMessage {
        ChatMessage::new(
            MessageIdFactory::generate(),
            RoomId::new("general").unwrap(),
            UserId::new("alice").unwrap(),
            MessageText::new("hello").unwrap(),
            Timestamp::new(created_at),
        )
    }

    #[test]
    fn test_order_key_follows_created_at() {
        // テスト項目: 作成時刻の早いメッセージが先に並ぶ
        // given (前提条件):
        let older = sample_message(1000);
        let newer = sample_message(2000);

        // then (期待する結果):
        assert!(older.order_key() < newer.order_key());
    }

    #[test]
    fn test_sender_name_fallback() {
        // テスト項目: プロフィールが解決できない場合は "Unknown" になる
        // given (前提条件):
        let resolved = MessageWithSender::new(
            sample_message(1000),
            Some(DisplayName::new("Alice").unwrap()),
        );
        let orphaned = MessageWithSender::new(sample_message(2000), None);

        // then (期待する結果):
        assert_eq!(resolved.sender_name_or_unknown(), "Alice");
        assert_eq!(orphaned.sender_name_or_unknown(), UNKNOWN_SENDER_NAME);
    }
}
