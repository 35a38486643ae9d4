//! Room session core: history, live messages, typing presence and the
//! controller that ties them to one open room.

pub mod controller;
pub mod event;
pub mod history;
pub mod live;
pub mod state;
pub mod typing;

pub use controller::{RoomSessionController, SessionPhase, SessionPorts, SessionUpdate};
pub use event::ChannelKind;
pub use history::load_history;
pub use state::MessageList;
pub use typing::{TYPING_TIMEOUT, TypingThrottle, TypingTracker, typing_indicator};
