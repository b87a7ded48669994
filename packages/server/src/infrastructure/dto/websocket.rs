//! WebSocket frame DTOs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Command;

/// Command kind on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandKindDto {
    Administrative,
    Broadcast,
    Rename,
    ListRooms,
    ChangeRoom,
    ListUsers,
}

/// Client → server command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDto {
    pub kind: CommandKindDto,
    #[serde(default)]
    pub text: String,
}

/// Server → client chat event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEventDto {
    /// RFC 3339, UTC
    pub timestamp: String,
    pub sender_id: String,
    pub text: String,
}

/// Malformed inbound frame. Terminates the connection's loop.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed command: {0}")]
    Json(#[from] serde_json::Error),
    #[error("binary frames are not supported")]
    BinaryFrame,
}

/// Decode one text frame.
///
/// A frame that parses as JSON must be a [`CommandDto`]. Anything else,
/// including chat text that merely starts with `{`, is a raw command line
/// classified by its prefix.
pub fn decode_command(frame: &str) -> Result<Command, ProtocolError> {
    if !frame.trim_start().starts_with('{') {
        return Ok(Command::parse_line(frame));
    }
    match serde_json::from_str::<serde_json::Value>(frame) {
        Ok(value) => {
            let dto: CommandDto = serde_json::from_value(value)?;
            Ok(dto.into())
        }
        Err(_) => Ok(Command::parse_line(frame)),
    }
}
