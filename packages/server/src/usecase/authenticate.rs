//! UseCase: Bearer トークン認証
//!
//! `Authorization: Bearer <token>` ヘッダーからユーザーを特定します。

use std::sync::Arc;

use crate::domain::{AccessTokenRepository, UserId};

use super::error::AuthError;

const BEARER_PREFIX: &str = "Bearer ";

/// Bearer トークン認証のユースケース
pub struct AuthenticateUseCase {
    tokens: Arc<dyn AccessTokenRepository>,
}

impl AuthenticateUseCase {
    /// 新しい AuthenticateUseCase を作成
    pub fn new(tokens: Arc<dyn AccessTokenRepository>) -> Self {
        Self { tokens }
    }

    /// Authorization ヘッダーの値を検証する
    ///
    /// # Arguments
    ///
    /// * `authorization` - Authorization ヘッダーの値（なければ `None`）
    ///
    /// # Returns
    ///
    /// * `Ok(UserId)` - トークンを発行されたユーザー
    /// * `Err(AuthError)` - ヘッダーがない、またはトークンが無効
    pub async fn execute(&self, authorization: Option<&str>) -> Result<UserId, AuthError> {
        let header = authorization.ok_or(AuthError::MissingCredential)?;
        let token = header.strip_prefix(BEARER_PREFIX).unwrap_or(header).trim();
        self.verify_token(token).await
    }

    /// 生のトークン文字列を検証する（WebSocket の `access_token` クエリ用）
    pub async fn verify_token(&self, token: &str) -> Result<UserId, AuthError> {
        if token.is_empty() {
            return Err(AuthError::InvalidCredential);
        }
        self.tokens
            .resolve_token(token)
            .await?
            .ok_or(AuthError::InvalidCredential)
    }
}
