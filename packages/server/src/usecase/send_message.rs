//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - メッセージの保存（ID・作成日時の採番）と change feed への公開
//!
//! ### どのような状況を想定しているか
//! - 正常系：メッセージが保存され、送信者名付きで返される
//! - 正常系：同じルームの購読者に挿入イベントが届く
//! - 異常系：存在しないルームへの送信

use std::sync::Arc;

use crate::domain::{
    MessageRepository, MessageText, MessageWithSender, ProfileRepository, RoomId, RoomRepository,
    UserId,
};

use super::{error::SendMessageError, resolve_sender::resolve_sender_name};

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    rooms: Arc<dyn RoomRepository>,
    messages: Arc<dyn MessageRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
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

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `sender` - 送信者（認証済みユーザー）
    /// * `room_id` - 送信先ルーム
    /// * `text` - メッセージ本文（Domain Model）
    ///
    /// # Returns
    ///
    /// * `Ok(MessageWithSender)` - 保存されたメッセージ
    /// * `Err(SendMessageError)` - 送信失敗
    pub async fn execute(
        &self,
        sender: UserId,
        room_id: RoomId,
        text: MessageText,
    ) -> Result<MessageWithSender, SendMessageError> {
        if self.rooms.find_room(&room_id).await?.is_none() {
            return Err(SendMessageError::RoomNotFound(room_id.into_string()));
        }

        let row = self
            .messages
            .insert_message(room_id, sender, text)
            .await?;
        tracing::info!("Message {} stored in '{}' by '{}'", row.id, row.room_id, row.user_id);

        let sender_name = resolve_sender_name(&self.profiles, &row.user_id).await;
        Ok(MessageWithSender::new(row, sender_name))
    }
}
