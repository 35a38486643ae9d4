//! Live Message Subscriber and typing channel forwarders.
//!
//! Forwarders own the receiving half of a subscription and post everything
//! they get to the controller's queue, tagged with the session generation.

use std::sync::Arc;

use tokio::{
    sync::mpsc::{Receiver, UnboundedSender},
    task::JoinHandle,
};

use studyhall_server::domain::{ChatMessage, MessageWithSender, TypingAnnouncement};

use crate::port::MessageStore;

use super::event::{ChannelKind, Generation, SessionEvent};

/// Attach the sender's display name to an inserted row.
///
/// Lookup failures fall back to an unnamed sender.
pub async fn resolve_live_message(store: &dyn MessageStore, message: ChatMessage) -> MessageWithSender {
    let sender_name = match store.sender_name(&message.user_id).await {
        Ok(name) => name,
        Err(e) => {
            tracing::warn!("Failed to resolve sender '{}': {}", message.user_id, e);
            None
        }
    };
    MessageWithSender::new(message, sender_name)
}

/// Forward change-feed rows, one at a time, to the controller.
pub fn spawn_feed_forwarder(
    store: Arc<dyn MessageStore>,
    mut rows: Receiver<ChatMessage>,
    generation: Generation,
    events: UnboundedSender<SessionEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(row) = rows.recv().await {
            let message = resolve_live_message(store.as_ref(), row).await;
            let event = SessionEvent::LiveMessage {
                generation,
                message,
            };
            if events.send(event).is_err() {
                return;
            }
        }
        let _ = events.send(SessionEvent::ChannelClosed {
            generation,
            channel: ChannelKind::Feed,
        });
    })
}

/// Forward typing announcements to the controller.
pub fn spawn_typing_forwarder(
    mut announcements: Receiver<TypingAnnouncement>,
    generation: Generation,
    events: UnboundedSender<SessionEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(announcement) = announcements.recv().await {
            let event = SessionEvent::TypingReceived {
                generation,
                announcement,
            };
            if events.send(event).is_err() {
                return;
            }
        }
        let _ = events.send(SessionEvent::ChannelClosed {
            generation,
            channel: ChannelKind::Typing,
        });
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ChatError, port::MockMessageStore};
    use studyhall_server::domain::{
        DisplayName, MessageIdFactory, MessageText, RoomId, Timestamp, UNKNOWN_SENDER_NAME,
        UserId,
    };
    use tokio::sync::mpsc;

    fn row(user: &str) -> ChatMessage {
        ChatMessage::new(
            MessageIdFactory::generate(),
            RoomId::new("general").unwrap(),
            UserId::new(user).unwrap(),
            MessageText::new("hi").unwrap(),
            Timestamp::new(1_000),
        )
    }

    #[tokio::test]
    async fn test_resolve_live_message_with_name() {
        // テスト項目: 送信者名が解決される
        // given (前提条件):
        let mut store = MockMessageStore::new();
        store
            .expect_sender_name()
            .returning(|_| Ok(Some(DisplayName::new("Bob").unwrap())));

        // when (操作):
        let message = resolve_live_message(&store, row("bob")).await;

        // then (期待する結果):
        assert_eq!(message.sender_name_or_unknown(), "Bob");
    }

    #[tokio::test]
    async fn test_resolve_live_message_lookup_failure() {
        // テスト項目: 名前の解決に失敗しても "Unknown" として配信される
        // given (前提条件):
        let mut store = MockMessageStore::new();
        store
            .expect_sender_name()
            .returning(|_| Err(ChatError::Retrieval("timeout".to_string())));

        // when (操作):
        let message = resolve_live_message(&store, row("bob")).await;

        // then (期待する結果):
        assert_eq!(message.sender_name_or_unknown(), UNKNOWN_SENDER_NAME);
    }

    #[tokio::test]
    async fn test_feed_forwarder_tags_generation_and_reports_close() {
        // テスト項目: 転送されたイベントには世代が付き、購読終了も通知される
        // given (前提条件):
        let mut store = MockMessageStore::new();
        store.expect_sender_name().returning(|_| Ok(None));
        let (row_tx, row_rx) = mpsc::channel(4);
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let forwarder = spawn_feed_forwarder(Arc::new(store), row_rx, 7, event_tx);

        // when (操作):
        row_tx.send(row("bob")).await.unwrap();
        drop(row_tx);
        forwarder.await.unwrap();

        // then (期待する結果):
        let first = event_rx.recv().await.unwrap();
        assert!(matches!(first, SessionEvent::LiveMessage { generation: 7, .. }));
        let second = event_rx.recv().await.unwrap();
        assert!(matches!(
            second,
            SessionEvent::ChannelClosed {
                generation: 7,
                channel: ChannelKind::Feed
            }
        ));
    }
}
