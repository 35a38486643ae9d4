//! Realtime WebSocket frame DTOs.
//!
//! The message feed pushes `{"type":"INSERT","record":{...}}` frames. The
//! typing channel exchanges `{"event":"user_typing","payload":{...}}` frames
//! in both directions.

use serde::{Deserialize, Serialize};

use studyhall_shared::time::{millis_to_rfc3339, rfc3339_to_millis};

use crate::domain::{
    ChatMessage, DisplayName, MessageId, MessageText, RoomId, Timestamp, TypingAnnouncement,
    UserId, ValueObjectError,
};

/// Query parameters of the realtime endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RealtimeQuery {
    pub access_token: Option<String>,
}

/// Change-feed event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FeedEventType {
    Insert,
}

/// A raw message row as carried by the change feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecordDto {
    pub id: String,
    pub room_id: String,
    pub user_id: String,
    pub message: String,
    pub created_at: String, // RFC 3339
}

/// Change-feed frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEventDto {
    pub r#type: FeedEventType,
    pub record: MessageRecordDto,
}

impl From<&ChatMessage> for FeedEventDto {
    fn from(message: &ChatMessage) -> Self {
        Self {
            r#type: FeedEventType::Insert,
            record: MessageRecordDto {
                id: message.id.to_string(),
                room_id: message.room_id.as_str().to_string(),
                user_id: message.user_id.as_str().to_string(),
                message: message.message.as_str().to_string(),
                created_at: millis_to_rfc3339(message.created_at.value()),
            },
        }
    }
}

impl TryFrom<MessageRecordDto> for ChatMessage {
    type Error = ValueObjectError;

    fn try_from(record: MessageRecordDto) -> Result<Self, Self::Error> {
        Ok(ChatMessage::new(
            MessageId::parse(&record.id)?,
            RoomId::new(record.room_id)?,
            UserId::new(record.user_id)?,
            MessageText::new(record.message)?,
            Timestamp::new(rfc3339_to_millis(&record.created_at).unwrap_or_default()),
        ))
    }
}

/// Broadcast event name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BroadcastEvent {
    UserTyping,
}

/// Typing announcement payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingPayloadDto {
    pub user_id: String,
    pub name: String,
    pub room_id: String,
}

/// Typing channel frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastFrameDto {
    pub event: BroadcastEvent,
    pub payload: TypingPayloadDto,
}

impl From<&TypingAnnouncement> for BroadcastFrameDto {
    fn from(announcement: &TypingAnnouncement) -> Self {
        Self {
            event: BroadcastEvent::UserTyping,
            payload: TypingPayloadDto {
                user_id: announcement.user_id.as_str().to_string(),
                name: announcement.name.as_str().to_string(),
                room_id: announcement.room_id.as_str().to_string(),
            },
        }
    }
}

impl TryFrom<TypingPayloadDto> for TypingAnnouncement {
    type Error = ValueObjectError;

    fn try_from(payload: TypingPayloadDto) -> Result<Self, Self::Error> {
        Ok(TypingAnnouncement::new(
            UserId::new(payload.user_id)?,
            DisplayName::new(payload.name)?,
            RoomId::new(payload.room_id)?,
        ))
    }
}
