//! In-memory wiring of every repository plus the realtime hub.
//!
//! Keeps the concrete handles so tests and the in-process client adapter
//! can reach store-only operations (deleting a profile, counting rows,
//! issuing tokens) that the repository traits do not expose.

use std::sync::Arc;

use crate::ui::state::AppState;

use super::{
    realtime::RealtimeHub,
    repository::{
        InMemoryAccessTokenRepository, InMemoryMessageRepository, InMemoryProfileRepository,
        InMemoryRoomRepository,
    },
    seed::SeedData,
};

/// All in-memory stores of one server instance
#[derive(Clone)]
pub struct InMemoryBackend {
    pub rooms: Arc<InMemoryRoomRepository>,
    pub messages: Arc<InMemoryMessageRepository>,
    pub profiles: Arc<InMemoryProfileRepository>,
    pub tokens: Arc<InMemoryAccessTokenRepository>,
    pub hub: Arc<RealtimeHub>,
}

impl InMemoryBackend {
    /// Build the stores and load the seed data
    pub async fn seeded(seed: SeedData) -> Self {
        let hub = Arc::new(RealtimeHub::new());
        let tokens = Arc::new(InMemoryAccessTokenRepository::new());
        let profiles = Arc::new(InMemoryProfileRepository::default());

        for account in seed.accounts {
            tokens.issue(account.token, account.profile.id.clone()).await;
            profiles.upsert(account.profile).await;
        }

        Self {
            rooms: Arc::new(InMemoryRoomRepository::new(seed.rooms)),
            messages: Arc::new(InMemoryMessageRepository::new(hub.clone())),
            profiles,
            tokens,
            hub,
        }
    }

    /// Application state backed by these stores
    pub fn app_state(&self) -> Arc<AppState> {
        Arc::new(AppState {
            rooms: self.rooms.clone(),
            messages: self.messages.clone(),
            profiles: self.profiles.clone(),
            tokens: self.tokens.clone(),
            hub: self.hub.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccessTokenRepository, RoomRepository, UserId};

    #[tokio::test]
    async fn test_seeded_backend() {
        // テスト項目: シードデータのルームとトークンが読み込まれる
        // when (操作):
        let backend = InMemoryBackend::seeded(SeedData::demo().unwrap()).await;

        // then (期待する結果):
        assert_eq!(backend.rooms.list_rooms().await.unwrap().len(), 3);
        assert_eq!(
            backend.tokens.resolve_token("bob-token").await.unwrap(),
            Some(UserId::new("bob").unwrap())
        );
    }
}
