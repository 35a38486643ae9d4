//! UseCase: メッセージ履歴取得
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - FetchMessagesUseCase::execute() メソッド
//! - 直近 N 件のメッセージを古い順に、送信者名付きで返す処理
//!
//! ### どのような状況を想定しているか
//! - 正常系：送信者名が解決される
//! - エッジケース：プロフィールが削除された送信者は名前なし（表示側で "Unknown"）
//! - 異常系：存在しないルーム、ストレージ障害

use std::sync::Arc;

use crate::domain::{
    MessageRepository, MessageWithSender, ProfileRepository, RoomId, RoomRepository,
};

use super::{error::FetchMessagesError, resolve_sender::SenderNameCache};

/// メッセージ履歴取得のユースケース
pub struct FetchMessagesUseCase {
    rooms: Arc<dyn RoomRepository>,
    messages: Arc<dyn MessageRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl FetchMessagesUseCase {
    /// 新しい FetchMessagesUseCase を作成
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        messages: Arc<dyn MessageRepository>,
        profiles: Arc<dyn ProfileRepository>,
    ) -> Self {
        Self {
            rooms,
            messages,
            profiles,
        }
    }

    /// メッセージ履歴取得を実行
    ///
    /// # Arguments
    ///
    /// * `room_id` - 対象ルーム
    /// * `limit` - 最大件数（直近のものから数える）
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<MessageWithSender>)` - 作成日時の昇順
    /// * `Err(FetchMessagesError)` - ルームが存在しない、または取得失敗
    pub async fn execute(
        &self,
        room_id: &RoomId,
        limit: usize,
    ) -> Result<Vec<MessageWithSender>, FetchMessagesError> {
        if self.rooms.find_room(room_id).await?.is_none() {
            return Err(FetchMessagesError::RoomNotFound(room_id.to_string()));
        }

        let rows = self.messages.recent_messages(room_id, limit).await?;

        let mut names = SenderNameCache::new(self.profiles.clone());
        let mut joined = Vec::with_capacity(rows.len());
        for row in rows {
            let sender_name = names.resolve(&row.user_id).await;
            joined.push(MessageWithSender::new(row, sender_name));
        }
        Ok(joined)
    }
}
