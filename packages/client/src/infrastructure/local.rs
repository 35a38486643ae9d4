//! In-process adapter over the server's application state.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast::error::RecvError, mpsc};

use studyhall_server::{
    domain::{DisplayName, MessageText, MessageWithSender, Room, RoomId, UserId},
    infrastructure::{InMemoryBackend, realtime::TypingEnvelope},
    ui::state::AppState,
    usecase::{FetchMessagesError, SendMessageError},
};

use crate::{
    error::ChatError,
    port::{
        ChangeFeed, FeedSubscription, MessageStore, ReleaseHandle, RoomDirectory,
        SUBSCRIPTION_BUFFER, TypingAnnouncer, TypingBroadcast, TypingChannel,
    },
};

/// Adapter that calls the server's use cases and realtime hub in-process
#[derive(Clone)]
pub struct LocalBackend {
    state: Arc<AppState>,
}

impl LocalBackend {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    pub fn from_backend(backend: &InMemoryBackend) -> Self {
        Self::new(backend.app_state())
    }

    async fn ensure_room(&self, room_id: &RoomId) -> Result<(), ChatError> {
        match self.state.rooms.find_room(room_id).await {
            Ok(Some(_)) => Ok(()),
            Ok(None) => Err(ChatError::NotFound(format!("room '{room_id}'"))),
            Err(e) => Err(ChatError::Subscription(e.to_string())),
        }
    }
}

#[async_trait]
impl MessageStore for LocalBackend {
    async fn recent_messages(
        &self,
        room_id: &RoomId,
        limit: usize,
    ) -> Result<Vec<MessageWithSender>, ChatError> {
        self.state
            .fetch_messages_usecase()
            .execute(room_id, limit)
            .await
            .map_err(|e| match e {
                FetchMessagesError::RoomNotFound(room) => ChatError::NotFound(format!("room '{room}'")),
                FetchMessagesError::Repository(e) => ChatError::Retrieval(e.to_string()),
            })
    }

    async fn insert_message(
        &self,
        room_id: &RoomId,
        sender: &UserId,
        text: &MessageText,
    ) -> Result<MessageWithSender, ChatError> {
        self.state
            .send_message_usecase()
            .execute(sender.clone(), room_id.clone(), text.clone())
            .await
            .map_err(|e| match e {
                SendMessageError::RoomNotFound(room) => ChatError::NotFound(format!("room '{room}'")),
                SendMessageError::Repository(e) => ChatError::Write(e.to_string()),
            })
    }

    async fn sender_name(&self, user_id: &UserId) -> Result<Option<DisplayName>, ChatError> {
        self.state
            .profiles
            .find_profile(user_id)
            .await
            .map(|profile| profile.map(|p| p.name))
            .map_err(|e| ChatError::Retrieval(e.to_string()))
    }
}

#[async_trait]
impl RoomDirectory for LocalBackend {
    async fn list_rooms(&self) -> Result<Vec<Room>, ChatError> {
        self.state
            .rooms
            .list_rooms()
            .await
            .map_err(|e| ChatError::Retrieval(e.to_string()))
    }
}

#[async_trait]
impl ChangeFeed for LocalBackend {
    async fn subscribe(&self, room_id: &RoomId) -> Result<FeedSubscription, ChatError> {
        self.ensure_room(room_id).await?;
        let mut inserts = self.state.hub.subscribe_messages(room_id).await;
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);

        let room = room_id.clone();
        let pump = tokio::spawn(async move {
            loop {
                match inserts.recv().await {
                    Ok(message) => {
                        if tx.send(message).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("Message feed for '{}' skipped {} events", room, skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        tracing::debug!("Subscribed to message feed of '{}'", room_id);
        Ok(FeedSubscription {
            room_id: room_id.clone(),
            events: rx,
            handle: ReleaseHandle::new(format!("message feed '{room_id}'"), move || {
                pump.abort();
                Ok(())
            }),
        })
    }
}

#[async_trait]
impl TypingBroadcast for LocalBackend {
    async fn join(&self, room_id: &RoomId) -> Result<TypingChannel, ChatError> {
        self.ensure_room(room_id).await?;
        let origin = uuid::Uuid::new_v4();
        let mut inbound = self.state.hub.subscribe_typing(room_id).await;
        let (in_tx, in_rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let (out_tx, mut out_rx) = mpsc::unbounded_channel();

        let hub = self.state.hub.clone();
        let pump = tokio::spawn(async move {
            loop {
                tokio::select! {
                    received = inbound.recv() => match received {
                        Ok(envelope) => {
                            if envelope.origin == origin {
                                continue;
                            }
                            if in_tx.send(envelope.announcement).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Lagged(_)) => continue,
                        Err(RecvError::Closed) => break,
                    },
                    outbound = out_rx.recv() => match outbound {
                        Some(announcement) => {
                            hub.publish_typing(TypingEnvelope { origin, announcement }).await;
                        }
                        None => break,
                    },
                }
            }
        });

        tracing::debug!("Joined typing channel of '{}'", room_id);
        Ok(TypingChannel {
            room_id: room_id.clone(),
            events: in_rx,
            announcer: TypingAnnouncer::new(out_tx),
            handle: ReleaseHandle::new(format!("typing channel '{room_id}'"), move || {
                pump.abort();
                Ok(())
            }),
        })
    }
}
