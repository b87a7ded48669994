//! Entities of the chat domain.

use super::value_object::{Nickname, RoomName, Timestamp};

/// Sender id of events produced by the server itself.
pub const SYSTEM_SENDER: &str = "system";

/// Sender id of the client-side novelty events; never a real user.
pub const COW_SENDER: &str = "cow";

/// Registry value: where a connection is and what it is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub room: RoomName,
    pub nick: Nickname,
}

impl User {
    pub fn new(room: RoomName, nick: Nickname) -> Self {
        Self { room, nick }
    }
}

/// A server→client chat event.
///
/// Immutable once built; every recipient gets its own clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEvent {
    pub timestamp: Timestamp,
    pub sender_id: String,
    pub text: String,
}

impl ChatEvent {
    pub fn new(timestamp: Timestamp, sender_id: String, text: String) -> Self {
        Self {
            timestamp,
            sender_id,
            text,
        }
    }

    /// Event sent by a user.
    pub fn from_user(timestamp: Timestamp, nick: &Nickname, text: impl Into<String>) -> Self {
        Self::new(timestamp, nick.as_str().to_string(), text.into())
    }

    /// Event produced by the server.
    pub fn system(timestamp: Timestamp, text: impl Into<String>) -> Self {
        Self::new(timestamp, SYSTEM_SENDER.to_string(), text.into())
    }

    /// Whether this event did not originate from a user.
    pub fn is_synthetic(&self) -> bool {
        self.sender_id == SYSTEM_SENDER || self.sender_id == COW_SENDER
    }
}
