//! Handler modules for HTTP and WebSocket endpoints.

pub mod auth;
pub mod error;
pub mod http;
pub mod realtime;

pub use auth::AuthUser;
pub use error::ApiError;

// Re-export HTTP handlers
pub use http::{
    chat_messages_method_not_allowed, get_me, get_profile, get_rooms, health_check,
    list_chat_messages, send_chat_message,
};

// Re-export realtime handlers
pub use realtime::{message_feed_handler, typing_channel_handler};
