//! Demo data loaded at start-up.
//!
//! Account management is outside this service, so rooms, profiles and
//! access tokens are seeded here.

use crate::domain::{DisplayName, Profile, Room, RoomId, Timestamp, UserId, ValueObjectError};

/// A demo account: profile plus the bearer token issued to it
#[derive(Debug, Clone)]
pub struct SeedAccount {
    pub profile: Profile,
    pub token: String,
}

/// Everything the server starts with
#[derive(Debug, Clone, Default)]
pub struct SeedData {
    pub rooms: Vec<Room>,
    pub accounts: Vec<SeedAccount>,
}

impl SeedData {
    /// Rooms only, no accounts
    pub fn rooms_only() -> Result<Self, ValueObjectError> {
        Ok(Self {
            rooms: default_rooms()?,
            accounts: Vec::new(),
        })
    }

    /// Default rooms plus two demo accounts (`alice-token`, `bob-token`)
    pub fn demo() -> Result<Self, ValueObjectError> {
        Ok(Self {
            rooms: default_rooms()?,
            accounts: vec![
                account("alice", "Alice", "alice-token")?,
                account("bob", "Bob", "bob-token")?,
            ],
        })
    }
}

fn default_rooms() -> Result<Vec<Room>, ValueObjectError> {
    let rooms = [
        ("general", "General", "Campus-wide chatter"),
        ("study-group", "Study Group", "Ask questions, share notes"),
        ("random", "Random", "Anything goes"),
    ];
    rooms
        .into_iter()
        .enumerate()
        .map(|(i, (id, name, description))| {
            Ok(Room::new(
                RoomId::new(id)?,
                name.to_string(),
                description.to_string(),
                Timestamp::new(i as i64),
            ))
        })
        .collect()
}

fn account(id: &str, name: &str, token: &str) -> Result<SeedAccount, ValueObjectError> {
    Ok(SeedAccount {
        profile: Profile::new(UserId::new(id)?, DisplayName::new(name)?),
        token: token.to_string(),
    })
}
