//! Domain errors.

use thiserror::Error;

use super::value_object::{ConnectionId, RoomName};

/// Value object validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("nickname must not be empty")]
    NicknameEmpty,

    #[error("nickname must be alphanumeric: '{0}'")]
    NicknameInvalidCharacters(String),

    #[error("room name must not be empty")]
    RoomNameEmpty,

    #[error("room name must be at most {0} characters")]
    RoomNameTooLong(usize),

    #[error("room name may only contain alphanumerics, '-' and '_': '{0}'")]
    RoomNameInvalidCharacters(String),
}

/// Room Directory errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("room already exists: {0}")]
    AlreadyExists(RoomName),

    #[error("room not found: {0}")]
    NotFound(RoomName),

    #[error("room is protected: {0}")]
    Protected(RoomName),
}

/// Connection Registry errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("unknown connection: {0}")]
    UnknownConnection(ConnectionId),

    #[error("connection already registered: {0}")]
    DuplicateConnection(ConnectionId),

    #[error(transparent)]
    Room(#[from] RoomError),
}

/// Persistence sink errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),

    #[error("invalid stored record: {0}")]
    InvalidRecord(String),
}
