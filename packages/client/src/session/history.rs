//! History Loader: the recent messages of a room, never an error.

use studyhall_server::domain::{MessageWithSender, RoomId};

use crate::port::MessageStore;

/// Fetch up to `limit` of the most recent messages of a room, oldest first.
///
/// Retrieval failures are logged and yield an empty list.
pub async fn load_history(
    store: &dyn MessageStore,
    room_id: &RoomId,
    limit: usize,
) -> Vec<MessageWithSender> {
    match store.recent_messages(room_id, limit).await {
        Ok(mut messages) => {
            messages.sort_by_key(|m| m.message.order_key());
            tracing::debug!("Loaded {} messages for room '{}'", messages.len(), room_id);
            messages
        }
        Err(e) => {
            tracing::warn!("Failed to load history for room '{}': {}", room_id, e);
            Vec::new()
        }
    }
}
