//! Ports the room session core is written against.
//!
//! Each realtime port hands back a subscription object holding the event
//! receiver plus a [`ReleaseHandle`]. Releasing is explicit and idempotent,
//! and also happens when the handle is dropped.

use async_trait::async_trait;
use tokio::sync::mpsc;

use studyhall_server::domain::{
    ChatMessage, DisplayName, MessageText, MessageWithSender, Room, RoomId, TypingAnnouncement,
    UserId,
};

use crate::error::ChatError;

/// Buffered events per realtime subscription
pub const SUBSCRIPTION_BUFFER: usize = 64;

/// Message table access
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// The most recent `limit` messages of a room, oldest first, with sender names
    async fn recent_messages(
        &self,
        room_id: &RoomId,
        limit: usize,
    ) -> Result<Vec<MessageWithSender>, ChatError>;

    /// Insert a message; the store assigns id and creation time
    async fn insert_message(
        &self,
        room_id: &RoomId,
        sender: &UserId,
        text: &MessageText,
    ) -> Result<MessageWithSender, ChatError>;

    /// Display name of a user, `None` if the profile does not exist
    async fn sender_name(&self, user_id: &UserId) -> Result<Option<DisplayName>, ChatError>;
}

/// Static room list
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomDirectory: Send + Sync {
    async fn list_rooms(&self) -> Result<Vec<Room>, ChatError>;
}

/// Per-room stream of inserted message rows
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    async fn subscribe(&self, room_id: &RoomId) -> Result<FeedSubscription, ChatError>;
}

/// Per-room ephemeral typing channel
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TypingBroadcast: Send + Sync {
    async fn join(&self, room_id: &RoomId) -> Result<TypingChannel, ChatError>;
}

type ReleaseFn = Box<dyn FnOnce() -> Result<(), ChatError> + Send>;

/// Tears down one realtime subscription exactly once
pub struct ReleaseHandle {
    label: String,
    release: Option<ReleaseFn>,
}

impl ReleaseHandle {
    pub fn new<F>(label: impl Into<String>, release: F) -> Self
    where
        F: FnOnce() -> Result<(), ChatError> + Send + 'static,
    {
        Self {
            label: label.into(),
            release: Some(Box::new(release)),
        }
    }

    /// A handle with nothing to tear down
    pub fn noop(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            release: None,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_released(&self) -> bool {
        self.release.is_none()
    }

    /// Release the subscription. Later calls are no-ops.
    pub fn release(&mut self) -> Result<(), ChatError> {
        match self.release.take() {
            Some(release) => release(),
            None => Ok(()),
        }
    }
}

impl Drop for ReleaseHandle {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            tracing::warn!("Failed to release {}: {}", self.label, e);
        }
    }
}

impl std::fmt::Debug for ReleaseHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReleaseHandle")
            .field("label", &self.label)
            .field("released", &self.is_released())
            .finish()
    }
}

/// An open change-feed subscription for one room
#[derive(Debug)]
pub struct FeedSubscription {
    pub room_id: RoomId,
    pub events: mpsc::Receiver<ChatMessage>,
    pub handle: ReleaseHandle,
}

/// Sends typing announcements without waiting for delivery
#[derive(Debug, Clone)]
pub struct TypingAnnouncer {
    outbound: mpsc::UnboundedSender<TypingAnnouncement>,
}

impl TypingAnnouncer {
    pub fn new(outbound: mpsc::UnboundedSender<TypingAnnouncement>) -> Self {
        Self { outbound }
    }

    pub fn announce(&self, announcement: TypingAnnouncement) -> Result<(), ChatError> {
        self.outbound
            .send(announcement)
            .map_err(|_| ChatError::Subscription("typing channel is closed".to_string()))
    }
}

/// A joined typing channel for one room
#[derive(Debug)]
pub struct TypingChannel {
    pub room_id: RoomId,
    pub events: mpsc::Receiver<TypingAnnouncement>,
    pub announcer: TypingAnnouncer,
    pub handle: ReleaseHandle,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    #[test]
    fn test_release_runs_once() {
        // テスト項目: release は一度だけ実行され、Drop でも二重に実行されない
        // given (前提条件):
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut handle = ReleaseHandle::new("feed", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        // when (操作):
        handle.release().unwrap();
        handle.release().unwrap();
        drop(handle);

        // then (期待する結果):
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_releases() {
        // テスト項目: 明示的に解放しなくても Drop で解放される
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        {
            let _handle = ReleaseHandle::new("typing", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(ChatError::Subscription("already gone".to_string()))
            });
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_announce_after_close_fails() {
        // テスト項目: 受信側が閉じた後の announce はエラーになる
        // given (前提条件):
        let (tx, rx) = mpsc::unbounded_channel();
        let announcer = TypingAnnouncer::new(tx);
        drop(rx);

        // when (操作):
        let result = announcer.announce(TypingAnnouncement::new(
            UserId::new("alice").unwrap(),
            DisplayName::new("Alice").unwrap(),
            RoomId::new("general").unwrap(),
        ));

        // then (期待する結果):
        assert!(matches!(result, Err(ChatError::Subscription(_))));
    }
}
