//! Events posted by background tasks to the session controller.

use std::fmt;

use studyhall_server::domain::{MessageWithSender, TypingAnnouncement, UserId};

use crate::error::ChatError;

/// Session generation a background task was started for
pub type Generation = u64;

/// Realtime channel a session holds per room
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Feed,
    Typing,
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelKind::Feed => write!(f, "message feed"),
            ChannelKind::Typing => write!(f, "typing channel"),
        }
    }
}

/// Work results queued for the controller.
///
/// Every event carries the generation it was produced for; the controller
/// drops events from any generation but the current one.
#[derive(Debug)]
pub enum SessionEvent {
    HistoryLoaded {
        generation: Generation,
        messages: Vec<MessageWithSender>,
    },
    LiveMessage {
        generation: Generation,
        message: MessageWithSender,
    },
    TypingReceived {
        generation: Generation,
        announcement: TypingAnnouncement,
    },
    TypingExpired {
        generation: Generation,
        user_id: UserId,
        epoch: u64,
    },
    SendCompleted {
        generation: Generation,
        draft: String,
        result: Result<MessageWithSender, ChatError>,
    },
    ChannelClosed {
        generation: Generation,
        channel: ChannelKind,
    },
}

impl SessionEvent {
    pub fn generation(&self) -> Generation {
        match self {
            SessionEvent::HistoryLoaded { generation, .. }
            | SessionEvent::LiveMessage { generation, .. }
            | SessionEvent::TypingReceived { generation, .. }
            | SessionEvent::TypingExpired { generation, .. }
            | SessionEvent::SendCompleted { generation, .. }
            | SessionEvent::ChannelClosed { generation, .. } => *generation,
        }
    }
}
