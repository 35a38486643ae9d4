//! In-process realtime hub.
//!
//! Each room lazily gets two independent `tokio::sync::broadcast` channels:
//! a change feed carrying every inserted message row, and an ephemeral
//! typing channel. Nothing sent on either channel is stored or replayed to
//! late subscribers.

use std::collections::HashMap;

use tokio::sync::{Mutex, broadcast};

use crate::domain::{ChatMessage, RoomId, TypingAnnouncement};

/// Buffered events per subscriber before it starts lagging
pub const CHANNEL_CAPACITY: usize = 256;

/// Identifies one realtime connection so relayed typing events can skip
/// the connection they came from.
pub type ConnectionId = uuid::Uuid;

/// A typing announcement tagged with the connection that sent it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingEnvelope {
    pub origin: ConnectionId,
    pub announcement: TypingAnnouncement,
}

/// Per-room realtime channels
#[derive(Default)]
pub struct RealtimeHub {
    message_feeds: Mutex<HashMap<RoomId, broadcast::Sender<ChatMessage>>>,
    typing_channels: Mutex<HashMap<RoomId, broadcast::Sender<TypingEnvelope>>>,
}

impl RealtimeHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish an inserted row to the room's change feed.
    ///
    /// Returns the number of subscribers that received it.
    pub async fn publish_message(&self, message: &ChatMessage) -> usize {
        let feeds = self.message_feeds.lock().await;
        match feeds.get(&message.room_id) {
            // send() only fails when nobody is listening
            Some(sender) => sender.send(message.clone()).unwrap_or(0),
            None => 0,
        }
    }

    /// Subscribe to inserts for one room.
    pub async fn subscribe_messages(&self, room_id: &RoomId) -> broadcast::Receiver<ChatMessage> {
        let mut feeds = self.message_feeds.lock().await;
        feeds
            .entry(room_id.clone())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Number of live change-feed subscriptions for a room.
    pub async fn message_subscriber_count(&self, room_id: &RoomId) -> usize {
        let feeds = self.message_feeds.lock().await;
        feeds
            .get(room_id)
            .map(broadcast::Sender::receiver_count)
            .unwrap_or(0)
    }

    /// Relay a typing announcement to everyone joined to its room.
    pub async fn publish_typing(&self, envelope: TypingEnvelope) -> usize {
        let channels = self.typing_channels.lock().await;
        match channels.get(&envelope.announcement.room_id) {
            Some(sender) => sender.send(envelope).unwrap_or(0),
            None => 0,
        }
    }

    /// Join a room's typing channel.
    pub async fn subscribe_typing(&self, room_id: &RoomId) -> broadcast::Receiver<TypingEnvelope> {
        let mut channels = self.typing_channels.lock().await;
        channels
            .entry(room_id.clone())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Number of live typing-channel members for a room.
    pub async fn typing_subscriber_count(&self, room_id: &RoomId) -> usize {
        let channels = self.typing_channels.lock().await;
        channels
            .get(room_id)
            .map(broadcast::Sender::receiver_count)
            .unwrap_or(0)
    }
}
