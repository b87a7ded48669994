//! Room Directory: the set of valid rooms and their history rings.

use std::collections::BTreeMap;

use super::{
    entity::ChatEvent, error::RoomError, history::HistoryRing, value_object::RoomName,
};

/// Name of the permanent default room.
pub const DEFAULT_ROOM: &str = "general";

#[derive(Debug, Clone)]
pub struct RoomDirectory {
    rooms: BTreeMap<RoomName, HistoryRing>,
    default_room: RoomName,
    history_len: usize,
}

impl RoomDirectory {
    /// Create a directory holding only `default_room`.
    pub fn new(default_room: RoomName, history_len: usize) -> Self {
        let mut rooms = BTreeMap::new();
        rooms.insert(default_room.clone(), HistoryRing::new(history_len));
        Self {
            rooms,
            default_room,
            history_len,
        }
    }

    pub fn default_room(&self) -> &RoomName {
        &self.default_room
    }

    pub fn history_len(&self) -> usize {
        self.history_len
    }

    pub fn exists(&self, name: &RoomName) -> bool {
        self.rooms.contains_key(name)
    }

    pub fn create(&mut self, name: RoomName) -> Result<(), RoomError> {
        if self.rooms.contains_key(&name) {
            return Err(RoomError::AlreadyExists(name));
        }
        self.rooms.insert(name, HistoryRing::new(self.history_len));
        Ok(())
    }

    /// Replace the ring of `name` with previously stored events, creating
    /// the room if needed.
    pub fn restore(&mut self, name: RoomName, events: impl IntoIterator<Item = ChatEvent>) {
        self.rooms
            .insert(name, HistoryRing::with_events(self.history_len, events));
    }

    /// Delete a room and its ring. The default room is protected.
    ///
    /// Only the directory side; users still pointing at the room must be
    /// reassigned by the caller in the same critical section.
    pub fn remove(&mut self, name: &RoomName) -> Result<(), RoomError> {
        if name == &self.default_room {
            return Err(RoomError::Protected(name.clone()));
        }
        self.rooms
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| RoomError::NotFound(name.clone()))
    }

    pub fn append(&mut self, name: &RoomName, event: ChatEvent) -> Result<(), RoomError> {
        let ring = self
            .rooms
            .get_mut(name)
            .ok_or_else(|| RoomError::NotFound(name.clone()))?;
        ring.push(event);
        Ok(())
    }

    /// Chronological contents of the ring of `name`.
    pub fn recent(&self, name: &RoomName) -> Result<Vec<ChatEvent>, RoomError> {
        self.rooms
            .get(name)
            .map(HistoryRing::recent)
            .ok_or_else(|| RoomError::NotFound(name.clone()))
    }

    pub fn ring(&self, name: &RoomName) -> Option<&HistoryRing> {
        self.rooms.get(name)
    }

    /// All room names, sorted.
    pub fn names(&self) -> Vec<RoomName> {
        self.rooms.keys().cloned().collect()
    }
}
