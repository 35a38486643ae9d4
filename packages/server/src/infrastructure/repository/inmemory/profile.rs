//! InMemory Profile Repository 実装

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{Profile, ProfileRepository, RepositoryError, UserId};

/// インメモリ Profile Repository 実装
#[derive(Default)]
pub struct InMemoryProfileRepository {
    profiles: RwLock<HashMap<UserId, Profile>>,
}

impl InMemoryProfileRepository {
    pub fn new(profiles: Vec<Profile>) -> Self {
        Self {
            profiles: RwLock::new(
                profiles
                    .into_iter()
                    .map(|profile| (profile.id.clone(), profile))
                    .collect(),
            ),
        }
    }

    /// プロフィールを追加または更新
    pub async fn upsert(&self, profile: Profile) {
        self.profiles
            .write()
            .await
            .insert(profile.id.clone(), profile);
    }

    /// プロフィールを削除（送信者名は "Unknown" にフォールバックする）
    pub async fn remove(&self, user_id: &UserId) -> Result<Profile, RepositoryError> {
        self.profiles
            .write()
            .await
            .remove(user_id)
            .ok_or_else(|| RepositoryError::ProfileNotFound(user_id.to_string()))
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn find_profile(&self, user_id: &UserId) -> Result<Option<Profile>, RepositoryError> {
        Ok(self.profiles.read().await.get(user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DisplayName;

    #[tokio::test]
    async fn test_remove_profile() {
        // テスト項目: 削除したプロフィールは検索できなくなる
        // given (前提条件):
        let alice = UserId::new("alice").unwrap();
        let repo = InMemoryProfileRepository::new(vec![Profile::new(
            alice.clone(),
            DisplayName::new("Alice").unwrap(),
        )]);
        assert!(repo.find_profile(&alice).await.unwrap().is_some());

        // when (操作):
        let removed = repo.remove(&alice).await;

        // then (期待する結果):
        assert!(removed.is_ok());
        assert!(repo.find_profile(&alice).await.unwrap().is_none());
        assert!(matches!(
            repo.remove(&alice).await,
            Err(RepositoryError::ProfileNotFound(_))
        ));
    }
}
