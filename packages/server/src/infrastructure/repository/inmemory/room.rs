//! InMemory Room Repository 実装
//!
//! ルーム一覧はセッション中は不変なので、起動時に渡された Vec をそのまま保持します。

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{RepositoryError, Room, RoomId, RoomRepository};

/// インメモリ Room Repository 実装
pub struct InMemoryRoomRepository {
    /// ルーム一覧（作成日時順）
    rooms: RwLock<Vec<Room>>,
}

impl InMemoryRoomRepository {
    /// 新しい InMemoryRoomRepository を作成
    pub fn new(mut rooms: Vec<Room>) -> Self {
        rooms.sort_by_key(|room| room.created_at);
        Self {
            rooms: RwLock::new(rooms),
        }
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn list_rooms(&self) -> Result<Vec<Room>, RepositoryError> {
        Ok(self.rooms.read().await.clone())
    }

    async fn find_room(&self, room_id: &RoomId) -> Result<Option<Room>, RepositoryError> {
        let rooms = self.rooms.read().await;
        Ok(rooms.iter().find(|room| &room.id == room_id).cloned())
    }
}
