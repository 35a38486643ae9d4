//! Shared application state.

use std::sync::Arc;

use crate::{
    domain::{AccessTokenRepository, MessageRepository, ProfileRepository, RoomRepository},
    infrastructure::realtime::RealtimeHub,
    usecase::{AuthenticateUseCase, FetchMessagesUseCase, SendMessageUseCase},
};

/// Shared application state
pub struct AppState {
    /// Room directory
    pub rooms: Arc<dyn RoomRepository>,
    /// Message table
    pub messages: Arc<dyn MessageRepository>,
    /// Profiles used for sender names
    pub profiles: Arc<dyn ProfileRepository>,
    /// Issued bearer tokens
    pub tokens: Arc<dyn AccessTokenRepository>,
    /// Change feeds and typing channels
    pub hub: Arc<RealtimeHub>,
}

impl AppState {
    pub fn authenticate_usecase(&self) -> AuthenticateUseCase {
        AuthenticateUseCase::new(self.tokens.clone())
    }

    pub fn fetch_messages_usecase(&self) -> FetchMessagesUseCase {
        FetchMessagesUseCase::new(
            self.rooms.clone(),
            self.messages.clone(),
            self.profiles.clone(),
        )
    }

    pub fn send_message_usecase(&self) -> SendMessageUseCase {
        SendMessageUseCase::new(
            self.rooms.clone(),
            self.messages.clone(),
            self.profiles.clone(),
        )
    }
}
