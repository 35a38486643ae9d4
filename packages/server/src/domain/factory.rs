//! Domain factories for creating domain entities and value objects.

use super::MessageId;

/// Factory for generating MessageId instances.
///
/// Identifiers are assigned by the store, never by clients.
pub struct MessageIdFactory;

impl MessageIdFactory {
    /// Generate a new MessageId backed by a time-ordered UUID v7.
    pub fn generate() -> MessageId {
        MessageId::from_uuid(uuid::Uuid::now_v7())
    }
}
