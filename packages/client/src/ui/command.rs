//! Input line parsing.

/// One line typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Rooms,
    Join(String),
    Leave,
    Quit,
    Send(String),
    Unknown(String),
    Empty,
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }
        if !line.starts_with('/') {
            return Command::Send(line.to_string());
        }

        let mut parts = line.splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or_default();
        let argument = parts.next().map(str::trim).unwrap_or_default();
        match (name, argument) {
            ("/rooms", _) => Command::Rooms,
            ("/join", room) if !room.is_empty() => Command::Join(room.to_string()),
            ("/leave", _) => Command::Leave,
            ("/quit" | "/exit", _) => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        }
    }
}

pub const HELP: &str = "Commands: /rooms, /join <room>, /leave, /quit. Anything else is sent to the room.";
