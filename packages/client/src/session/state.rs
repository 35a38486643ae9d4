//! Displayed message list of one room session.

use std::collections::HashSet;

use studyhall_server::domain::{MessageId, MessageWithSender};

/// Messages ordered by `(created_at, id)` with no id twice
#[derive(Debug, Default)]
pub struct MessageList {
    messages: Vec<MessageWithSender>,
    ids: HashSet<MessageId>,
}

impl MessageList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a message at its ordered position.
    ///
    /// Returns `false` when a message with the same id is already present.
    pub fn insert(&mut self, message: MessageWithSender) -> bool {
        if !self.ids.insert(message.message.id) {
            return false;
        }
        let key = message.message.order_key();
        // live events almost always land at the end
        let position = self
            .messages
            .partition_point(|existing| existing.message.order_key() < key);
        self.messages.insert(position, message);
        true
    }

    /// Merge a history batch into whatever arrived live meanwhile.
    ///
    /// Returns the number of messages actually added.
    pub fn merge(&mut self, batch: Vec<MessageWithSender>) -> usize {
        batch
            .into_iter()
            .map(|message| self.insert(message))
            .filter(|inserted| *inserted)
            .count()
    }

    pub fn contains(&self, id: &MessageId) -> bool {
        self.ids.contains(id)
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn as_slice(&self) -> &[MessageWithSender] {
        &self.messages
    }

    pub fn iter(&self) -> impl Iterator<Item = &MessageWithSender> {
        self.messages.iter()
    }
}
