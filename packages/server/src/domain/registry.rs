//! Connection Registry: live connections and their current room and nick.
//!
//! The registry has no lock of its own. It is only reachable through
//! [`ChatState`](super::state::ChatState), which is owned by a single
//! mutual-exclusion domain.

use std::collections::HashMap;

use super::{
    entity::{ChatEvent, User},
    error::RegistryError,
    outbox::Outbox,
    value_object::{ConnectionId, Nickname, RoomName},
};

#[derive(Debug)]
struct Entry {
    user: User,
    outbox: Outbox,
}

#[derive(Debug, Default)]
pub struct Registry {
    entries: HashMap<ConnectionId, Entry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection. Returns `false` if the id was already registered.
    pub fn register(&mut self, conn: ConnectionId, user: User, outbox: Outbox) -> bool {
        if self.entries.contains_key(&conn) {
            return false;
        }
        self.entries.insert(conn, Entry { user, outbox });
        true
    }

    pub fn unregister(&mut self, conn: &ConnectionId) -> Option<User> {
        self.entries.remove(conn).map(|entry| entry.user)
    }

    pub fn get(&self, conn: &ConnectionId) -> Option<&User> {
        self.entries.get(conn).map(|entry| &entry.user)
    }

    pub fn outbox(&self, conn: &ConnectionId) -> Option<&Outbox> {
        self.entries.get(conn).map(|entry| &entry.outbox)
    }

    /// Atomic read-modify-write of one entry.
    pub fn update<R>(
        &mut self,
        conn: &ConnectionId,
        f: impl FnOnce(&mut User) -> R,
    ) -> Result<R, RegistryError> {
        self.entries
            .get_mut(conn)
            .map(|entry| f(&mut entry.user))
            .ok_or(RegistryError::UnknownConnection(*conn))
    }

    pub fn snapshot(&self) -> Vec<(ConnectionId, User)> {
        self.entries
            .iter()
            .map(|(conn, entry)| (*conn, entry.user.clone()))
            .collect()
    }

    pub fn nicks(&self) -> impl Iterator<Item = &Nickname> {
        self.entries.values().map(|entry| &entry.user.nick)
    }

    /// Nicks of every user in `room`, sorted.
    pub fn members_of(&self, room: &RoomName) -> Vec<Nickname> {
        let mut nicks: Vec<Nickname> = self
            .entries
            .values()
            .filter(|entry| &entry.user.room == room)
            .map(|entry| entry.user.nick.clone())
            .collect();
        nicks.sort();
        nicks
    }

    pub fn count_in(&self, room: &RoomName) -> usize {
        self.entries
            .values()
            .filter(|entry| &entry.user.room == room)
            .count()
    }

    pub fn find_by_nick(&self, nick: &str) -> Option<ConnectionId> {
        self.entries
            .iter()
            .find(|(_, entry)| entry.user.nick.as_str() == nick)
            .map(|(conn, _)| *conn)
    }

    /// Move every user in `from` to `to`, returning who moved.
    pub fn reassign(&mut self, from: &RoomName, to: &RoomName) -> Vec<ConnectionId> {
        self.entries
            .iter_mut()
            .filter(|(_, entry)| &entry.user.room == from)
            .map(|(conn, entry)| {
                entry.user.room = to.clone();
                *conn
            })
            .collect()
    }

    /// Broadcast fan-out: queue `event` for every connection in `room`.
    ///
    /// Returns the number of outboxes that accepted the event. Closed
    /// outboxes are skipped; their loops unregister them shortly.
    pub fn fan_out(&self, room: &RoomName, event: &ChatEvent) -> usize {
        let mut delivered = 0;
        for entry in self.entries.values() {
            if &entry.user.room == room && entry.outbox.push(event.clone()) {
                delivered += 1;
            }
        }
        delivered
    }

    pub fn outboxes(&self) -> impl Iterator<Item = &Outbox> {
        self.entries.values().map(|entry| &entry.outbox)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
