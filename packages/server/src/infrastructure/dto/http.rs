//! HTTP API request/response DTOs for the chat application.

use serde::{Deserialize, Serialize};

use studyhall_shared::time::{millis_to_rfc3339, rfc3339_to_millis};

use crate::domain::{
    ChatMessage, DisplayName, MessageId, MessageText, MessageWithSender, Profile, Room, RoomId,
    Timestamp, UserId, ValueObjectError,
};

/// Room summary for the directory endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummaryDto {
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_at: String, // RFC 3339
}

impl From<&Room> for RoomSummaryDto {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.as_str().to_string(),
            name: room.name.clone(),
            description: room.description.clone(),
            created_at: millis_to_rfc3339(room.created_at.value()),
        }
    }
}

impl TryFrom<RoomSummaryDto> for Room {
    type Error = ValueObjectError;

    fn try_from(dto: RoomSummaryDto) -> Result<Self, Self::Error> {
        Ok(Room::new(
            RoomId::new(dto.id)?,
            dto.name,
            dto.description,
            Timestamp::new(rfc3339_to_millis(&dto.created_at).unwrap_or_default()),
        ))
    }
}

/// Public profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDto {
    pub id: String,
    pub name: String,
}

impl From<&Profile> for ProfileDto {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id.as_str().to_string(),
            name: profile.name.as_str().to_string(),
        }
    }
}

/// Query string of `GET /functions/v1/chat-messages`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListMessagesQuery {
    pub room_id: Option<String>,
    /// Kept as a string so a malformed value becomes a 400, not a rejection
    pub limit: Option<String>,
}

/// Body of `POST /functions/v1/chat-messages`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SendMessageRequestDto {
    pub room_id: Option<String>,
    pub message: Option<String>,
}

/// A message joined with its sender name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponseDto {
    pub id: String,
    pub room_id: String,
    pub user_id: String,
    pub message: String,
    pub created_at: String, // RFC 3339
    pub sender_name: String,
}

impl From<&MessageWithSender> for MessageResponseDto {
    fn from(value: &MessageWithSender) -> Self {
        let message = &value.message;
        Self {
            id: message.id.to_string(),
            room_id: message.room_id.as_str().to_string(),
            user_id: message.user_id.as_str().to_string(),
            message: message.message.as_str().to_string(),
            created_at: millis_to_rfc3339(message.created_at.value()),
            sender_name: value.sender_name_or_unknown().to_string(),
        }
    }
}

impl TryFrom<MessageResponseDto> for MessageWithSender {
    type Error = ValueObjectError;

    fn try_from(dto: MessageResponseDto) -> Result<Self, Self::Error> {
        let message = ChatMessage::new(
            MessageId::parse(&dto.id)?,
            RoomId::new(dto.room_id)?,
            UserId::new(dto.user_id)?,
            MessageText::new(dto.message)?,
            Timestamp::new(rfc3339_to_millis(&dto.created_at).unwrap_or_default()),
        );
        Ok(MessageWithSender::new(
            message,
            DisplayName::new(dto.sender_name).ok(),
        ))
    }
}

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponseDto {
    pub error: String,
}
