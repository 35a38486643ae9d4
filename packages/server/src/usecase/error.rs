//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::RepositoryError;

/// 認証エラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authorization ヘッダーがない
    #[error("missing bearer credential")]
    MissingCredential,

    /// トークンが無効
    #[error("invalid bearer credential")]
    InvalidCredential,

    /// トークンの検証中にストレージが失敗した
    #[error("credential lookup failed: {0}")]
    Repository(#[from] RepositoryError),
}

/// メッセージ履歴取得のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchMessagesError {
    #[error("room not found: {0}")]
    RoomNotFound(String),

    #[error("failed to retrieve messages: {0}")]
    Repository(#[from] RepositoryError),
}

/// メッセージ送信のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SendMessageError {
    #[error("room not found: {0}")]
    RoomNotFound(String),

    #[error("failed to write message: {0}")]
    Repository(#[from] RepositoryError),
}
