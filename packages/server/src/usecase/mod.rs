//! UseCase 層
//!
//! ビジネスロジックを実装するレイヤー。
//! UI 層から呼び出され、Domain 層を操作します。

pub mod authenticate;
pub mod error;
pub mod fetch_messages;
pub mod resolve_sender;
pub mod send_message;

pub use authenticate::AuthenticateUseCase;
pub use error::{AuthError, FetchMessagesError, SendMessageError};
pub use fetch_messages::FetchMessagesUseCase;
pub use resolve_sender::{SenderNameCache, resolve_sender_name};
pub use send_message::SendMessageUseCase;
