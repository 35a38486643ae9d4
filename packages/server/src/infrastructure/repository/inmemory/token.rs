//! InMemory Access Token Repository 実装
//!
//! サインイン処理は対象外のため、トークンは起動時に発行済みのものを保持するだけです。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{AccessTokenRepository, RepositoryError, UserId};

/// インメモリ Access Token Repository 実装
#[derive(Default)]
pub struct InMemoryAccessTokenRepository {
    tokens: RwLock<HashMap<String, UserId>>,
}

impl InMemoryAccessTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// トークンを発行済みとして登録
    pub async fn issue(&self, token: impl Into<String>, user_id: UserId) {
        self.tokens.write().await.insert(token.into(), user_id);
    }

    /// トークンを失効させる
    pub async fn revoke(&self, token: &str) -> bool {
        self.tokens.write().await.remove(token).is_some()
    }
}

#[async_trait]
impl AccessTokenRepository for InMemoryAccessTokenRepository {
    async fn resolve_token(&self, token: &str) -> Result<Option<UserId>, RepositoryError> {
        Ok(self.tokens.read().await.get(token).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_issue_and_revoke() {
        // テスト項目: 発行したトークンは解決でき、失効後は解決できない
        // given (前提条件):
        let repo = InMemoryAccessTokenRepository::new();
        let alice = UserId::new("alice").unwrap();
        repo.issue("alice-token", alice.clone()).await;

        // then (期待する結果):
        assert_eq!(repo.resolve_token("alice-token").await.unwrap(), Some(alice));
        assert!(repo.revoke("alice-token").await);
        assert_eq!(repo.resolve_token("alice-token").await.unwrap(), None);
    }
}
