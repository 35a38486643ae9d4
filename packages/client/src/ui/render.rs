//! Text rendering for the terminal.

use studyhall_server::domain::{MessageWithSender, Room};
use studyhall_shared::time::millis_to_clock;

use crate::session::{RoomSessionController, SessionUpdate};

/// `[12:34] Alice: hello`
pub fn format_message(message: &MessageWithSender) -> String {
    format!(
        "[{}] {}: {}",
        millis_to_clock(message.message.created_at.value()),
        message.sender_name_or_unknown(),
        message.message.message
    )
}

pub fn format_room(room: &Room) -> String {
    if room.description.is_empty() {
        format!("  {:<14} {}", room.id.as_str(), room.name)
    } else {
        format!(
            "  {:<14} {} - {}",
            room.id.as_str(),
            room.name,
            room.description
        )
    }
}

/// Lines to print for one session update
pub fn render_update(controller: &RoomSessionController, update: &SessionUpdate) -> Vec<String> {
    match update {
        SessionUpdate::HistoryLoaded { room_id, count } => {
            let mut lines = vec![format!("--- #{room_id} ({count} messages) ---")];
            lines.extend(controller.messages().iter().map(format_message));
            lines
        }
        SessionUpdate::MessageAdded(message) => vec![format_message(message)],
        SessionUpdate::TypingChanged(indicator) => indicator
            .as_ref()
            .map(|text| vec![format!("  ({text})")])
            .unwrap_or_default(),
        SessionUpdate::SendFailed { draft, error } => {
            vec![format!("! Message not sent ({error}). Draft: {draft}")]
        }
        SessionUpdate::ChannelClosed(channel) => {
            vec![format!("! The {channel} closed; live updates stopped.")]
        }
    }
}
