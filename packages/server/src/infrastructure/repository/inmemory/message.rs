//! InMemory Message Repository 実装
//!
//! 追記専用のメッセージテーブル。挿入された行は RealtimeHub 経由で
//! ルームの change feed に公開されます（DB の行挿入イベントに相当）。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use studyhall_shared::time::now_millis;

use crate::{
    domain::{
        ChatMessage, MessageIdFactory, MessageRepository, MessageText, RepositoryError, RoomId,
        Timestamp, UserId,
    },
    infrastructure::realtime::RealtimeHub,
};

#[derive(Default)]
struct MessageTable {
    rows: Vec<ChatMessage>,
    last_created_at: i64,
}

/// インメモリ Message Repository 実装
pub struct InMemoryMessageRepository {
    table: Mutex<MessageTable>,
    /// 挿入イベントの公開先
    hub: Arc<RealtimeHub>,
}

impl InMemoryMessageRepository {
    /// 新しい InMemoryMessageRepository を作成
    pub fn new(hub: Arc<RealtimeHub>) -> Self {
        Self {
            table: Mutex::new(MessageTable::default()),
            hub,
        }
    }

    /// 保存済みメッセージ数
    pub async fn count(&self) -> usize {
        self.table.lock().await.rows.len()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn recent_messages(
        &self,
        room_id: &RoomId,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let table = self.table.lock().await;
        // rows are appended in created_at order, so a reverse scan yields newest first
        let mut recent: Vec<ChatMessage> = table
            .rows
            .iter()
            .rev()
            .filter(|row| &row.room_id == room_id)
            .take(limit)
            .cloned()
            .collect();
        recent.reverse();
        Ok(recent)
    }

    async fn insert_message(
        &self,
        room_id: RoomId,
        user_id: UserId,
        message: MessageText,
    ) -> Result<ChatMessage, RepositoryError> {
        let row = {
            let mut table = self.table.lock().await;
            // creation times are strictly increasing even within one millisecond
            let created_at = now_millis().max(table.last_created_at + 1);
            table.last_created_at = created_at;

            let row = ChatMessage::new(
                MessageIdFactory::generate(),
                room_id,
                user_id,
                message,
                Timestamp::new(created_at),
            );
            table.rows.push(row.clone());
            row
        };

        let delivered = self.hub.publish_message(&row).await;
        tracing::debug!(
            "Inserted message {} into '{}' ({} live subscribers)",
            row.id,
            row.room_id,
            delivered
        );

        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 直近 N 件の取得（古い順に並ぶこと、ルームで絞り込まれること）
    // - 挿入時に ID と作成日時が採番されること
    // - 挿入された行が change feed に公開されること
    // ========================================

    fn create_test_repository() -> (InMemoryMessageRepository, Arc<RealtimeHub>) {
        let hub = Arc::new(RealtimeHub::new());
        (InMemoryMessageRepository::new(hub.clone()), hub)
    }

    async fn insert(repo: &InMemoryMessageRepository, room: &str, text: &str) -> ChatMessage {
        repo.insert_message(
            RoomId::new(room).unwrap(),
            UserId::new("alice").unwrap(),
            MessageText::new(text).unwrap(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_created_at() {
        // テスト項目: 連続して挿入しても作成日時は狭義単調増加する
        // given (前提条件):
        let (repo, _hub) = create_test_repository();

        // when (操作):
        let first = insert(&repo, "general", "one").await;
        let second = insert(&repo, "general", "two").await;

        // then (期待する結果):
        assert!(first.created_at < second.created_at);
        assert_ne!(first.id, second.id);
        assert_eq!(repo.count().await, 2);
    }

    #[tokio::test]
    async fn test_recent_messages_returns_newest_window_oldest_first() {
        // テスト項目: 直近 limit 件を古い順で返し、他のルームは含めない
        // given (前提条件):
        let (repo, _hub) = create_test_repository();
        for i in 0..5 {
            insert(&repo, "general", &format!("msg {i}")).await;
            insert(&repo, "random", &format!("other {i}")).await;
        }

        // when (操作):
        let recent = repo
            .recent_messages(&RoomId::new("general").unwrap(), 3)
            .await
            .unwrap();

        // then (期待する結果):
        let texts: Vec<&str> = recent.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(texts, vec!["msg 2", "msg 3", "msg 4"]);
    }

    #[tokio::test]
    async fn test_insert_publishes_to_change_feed() {
        // テスト項目: 挿入された行が同じルームの change feed に届く
        // given (前提条件):
        let (repo, hub) = create_test_repository();
        let mut feed = hub.subscribe_messages(&RoomId::new("general").unwrap()).await;

        // when (操作):
        let row = insert(&repo, "general", "hello").await;

        // then (期待する結果):
        assert_eq!(feed.recv().await.unwrap(), row);
    }
}
