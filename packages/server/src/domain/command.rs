//! Client→server commands.

use super::value_object::RoomName;

/// Kind of an inbound command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Administrative,
    Broadcast,
    Rename,
    ListRooms,
    ChangeRoom,
    ListUsers,
}

/// One inbound command, consumed by a single dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub kind: CommandKind,
    pub text: String,
}

impl Command {
    pub fn new(kind: CommandKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Classify a raw command line by its prefix.
    ///
    /// `sudo <x>`, `mv <x>`, `cd <x>` carry the remainder as text; `ls` and
    /// `who` must match exactly. Anything else is a broadcast of the whole line.
    pub fn parse_line(line: &str) -> Self {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("sudo ") {
            return Self::new(CommandKind::Administrative, rest.trim());
        }
        if let Some(rest) = line.strip_prefix("mv ") {
            return Self::new(CommandKind::Rename, rest.trim());
        }
        if let Some(rest) = line.strip_prefix("cd ") {
            return Self::new(CommandKind::ChangeRoom, rest.trim());
        }
        match line {
            "ls" => Self::new(CommandKind::ListRooms, ""),
            "who" => Self::new(CommandKind::ListUsers, ""),
            _ => Self::new(CommandKind::Broadcast, line),
        }
    }
}

/// Administrative sub-command, available to the admin nick only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    Create(RoomName),
    Delete(RoomName),
    Kick(String),
    Count,
    Help,
}

impl AdminCommand {
    /// Names listed by `help`.
    pub const NAMES: [&'static str; 5] = ["create", "delete", "kick", "count", "help"];

    /// Parse `create <room>`, `delete <room>`, `kick <nick>`, `count` or `help`.
    ///
    /// Returns `None` for unknown or malformed input, including room names
    /// that are not valid.
    pub fn parse(text: &str) -> Option<Self> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        match tokens.as_slice() {
            ["create", room] => RoomName::new(room.to_string()).ok().map(Self::Create),
            ["delete", room] => RoomName::new(room.to_string()).ok().map(Self::Delete),
            ["kick", nick] => Some(Self::Kick(nick.to_string())),
            ["count"] => Some(Self::Count),
            ["help"] => Some(Self::Help),
            _ => None,
        }
    }
}
