//! The shared chat state: Connection Registry plus Room Directory.
//!
//! `ChatState` is the only owner of both structures and exposes nothing but
//! whole operations. Each `&mut self` method is one atomic step as long as
//! the state sits behind a single lock, which is how
//! [`InMemoryChatRepository`](crate::infrastructure::repository::InMemoryChatRepository)
//! holds it. Outbound events produced by an operation are queued onto the
//! affected outboxes before the method returns, so per-room delivery order
//! matches append order.

use super::{
    directory::RoomDirectory,
    entity::{ChatEvent, User},
    error::{RegistryError, RoomError},
    nick::{NickMap, NickRequest, NickVerdict, verify_nick},
    notice,
    outbox::Outbox,
    registry::Registry,
    value_object::{ConnectionId, Nickname, RoomName, Timestamp},
};

/// Result of a successful broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Broadcast {
    pub room: RoomName,
    pub event: ChatEvent,
    /// Number of outboxes that accepted the event.
    pub delivered: usize,
}

/// Result of registering a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Joined {
    /// The nick actually assigned, made unique if the requested one was held.
    pub nick: Nickname,
    /// Number of history events replayed into the outbox.
    pub replayed: usize,
}

/// Read-only view of one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSummary {
    pub name: RoomName,
    pub members: usize,
    pub history: usize,
}

#[derive(Debug)]
pub struct ChatState {
    registry: Registry,
    directory: RoomDirectory,
}

impl ChatState {
    pub fn new(directory: RoomDirectory) -> Self {
        Self {
            registry: Registry::new(),
            directory,
        }
    }

    pub fn default_room(&self) -> &RoomName {
        self.directory.default_room()
    }

    /// Register a new connection in the default room and replay that room's
    /// history into its outbox.
    ///
    /// `nick` is a placeholder; if someone already holds it a counter is
    /// appended (`nick2`, `nick3`, ...) until it is free.
    pub fn connect(
        &mut self,
        conn: ConnectionId,
        nick: Nickname,
        outbox: Outbox,
    ) -> Result<Joined, RegistryError> {
        if self.registry.get(&conn).is_some() {
            return Err(RegistryError::DuplicateConnection(conn));
        }
        let nick = self.unique_nick(nick);
        let room = self.directory.default_room().clone();
        let history = self.directory.recent(&room)?;
        for event in &history {
            outbox.push(event.clone());
        }
        self.registry.register(conn, User::new(room, nick.clone()), outbox);
        Ok(Joined {
            nick,
            replayed: history.len(),
        })
    }

    fn unique_nick(&self, nick: Nickname) -> Nickname {
        if self.registry.find_by_nick(nick.as_str()).is_none() {
            return nick;
        }
        let mut counter = 2usize;
        loop {
            let candidate = format!("{}{}", nick, counter);
            if self.registry.find_by_nick(&candidate).is_none() {
                if let Ok(candidate) = Nickname::new(candidate) {
                    return candidate;
                }
            }
            counter += 1;
        }
    }

    pub fn disconnect(&mut self, conn: &ConnectionId) -> Option<User> {
        self.registry.unregister(conn)
    }

    pub fn user(&self, conn: &ConnectionId) -> Option<User> {
        self.registry.get(conn).cloned()
    }

    pub fn snapshot(&self) -> Vec<(ConnectionId, User)> {
        self.registry.snapshot()
    }

    /// Atomic read-modify-write of one registry entry.
    ///
    /// A room change through this method must name an existing room.
    pub fn update<R>(
        &mut self,
        conn: &ConnectionId,
        f: impl FnOnce(&mut User) -> R,
    ) -> Result<R, RegistryError> {
        let mut user = self.user(conn).ok_or(RegistryError::UnknownConnection(*conn))?;
        let result = f(&mut user);
        if !self.directory.exists(&user.room) {
            return Err(RoomError::NotFound(user.room).into());
        }
        self.registry.update(conn, |entry| *entry = user)?;
        Ok(result)
    }

    /// Append a user message to the sender's room and fan it out to every
    /// member of that room, sender included.
    pub fn broadcast(
        &mut self,
        conn: &ConnectionId,
        text: String,
        timestamp: Timestamp,
    ) -> Result<Broadcast, RegistryError> {
        let user = self
            .registry
            .get(conn)
            .ok_or(RegistryError::UnknownConnection(*conn))?;
        let room = user.room.clone();
        let event = ChatEvent::from_user(timestamp, &user.nick, text);
        self.directory.append(&room, event.clone())?;
        let delivered = self.registry.fan_out(&room, &event);
        Ok(Broadcast {
            room,
            event,
            delivered,
        })
    }

    /// Verify and assign a nickname in one step.
    pub fn rename(
        &mut self,
        conn: &ConnectionId,
        request: &NickRequest<'_>,
        nick_map: &NickMap,
    ) -> Result<NickVerdict, RegistryError> {
        if self.registry.get(conn).is_none() {
            return Err(RegistryError::UnknownConnection(*conn));
        }
        let verdict = verify_nick(request, self.registry.nicks(), nick_map);
        if let NickVerdict::Ok(nick) = &verdict {
            self.registry.update(conn, |user| user.nick = nick.clone())?;
        }
        Ok(verdict)
    }

    /// Move a connection to `room`, then queue a confirmation followed by
    /// the room's history. An unknown room leaves the user untouched.
    pub fn change_room(
        &mut self,
        conn: &ConnectionId,
        room: &RoomName,
        timestamp: Timestamp,
    ) -> Result<usize, RegistryError> {
        let history = self.directory.recent(room)?;
        self.registry
            .update(conn, |user| user.room = room.clone())?;
        if let Some(outbox) = self.registry.outbox(conn) {
            outbox.push(ChatEvent::system(timestamp, notice::connected_to(room)));
            for event in &history {
                outbox.push(event.clone());
            }
        }
        Ok(history.len())
    }

    /// Current room of `conn` and every room name, sorted.
    pub fn list_rooms(
        &self,
        conn: &ConnectionId,
    ) -> Result<(RoomName, Vec<RoomName>), RegistryError> {
        let user = self
            .registry
            .get(conn)
            .ok_or(RegistryError::UnknownConnection(*conn))?;
        Ok((user.room.clone(), self.directory.names()))
    }

    /// Current room of `conn` and the sorted nicks sharing it.
    pub fn list_users(
        &self,
        conn: &ConnectionId,
    ) -> Result<(RoomName, Vec<Nickname>), RegistryError> {
        let user = self
            .registry
            .get(conn)
            .ok_or(RegistryError::UnknownConnection(*conn))?;
        Ok((user.room.clone(), self.registry.members_of(&user.room)))
    }

    pub fn create_room(&mut self, name: RoomName) -> Result<(), RoomError> {
        self.directory.create(name)
    }

    /// Delete a room, move its members to the default room and queue one
    /// notice for each of them. Returns the displaced connections.
    pub fn remove_room(
        &mut self,
        name: &RoomName,
        timestamp: Timestamp,
    ) -> Result<Vec<ConnectionId>, RoomError> {
        self.directory.remove(name)?;
        let default_room = self.directory.default_room().clone();
        let displaced = self.registry.reassign(name, &default_room);
        let text = notice::displaced(&default_room);
        for conn in &displaced {
            if let Some(outbox) = self.registry.outbox(conn) {
                outbox.push(ChatEvent::system(timestamp, text.clone()));
            }
        }
        Ok(displaced)
    }

    /// Queue an event for one connection only.
    pub fn notify(&self, conn: &ConnectionId, event: ChatEvent) -> bool {
        self.registry
            .outbox(conn)
            .is_some_and(|outbox| outbox.push(event))
    }

    pub fn room_exists(&self, name: &RoomName) -> bool {
        self.directory.exists(name)
    }

    pub fn recent(&self, name: &RoomName) -> Result<Vec<ChatEvent>, RoomError> {
        self.directory.recent(name)
    }

    /// Ask the connection using `nick` to close. Its own loop unregisters it.
    pub fn kick(&self, nick: &str) -> Option<ConnectionId> {
        let conn = self.registry.find_by_nick(nick)?;
        if let Some(outbox) = self.registry.outbox(&conn) {
            outbox.close("Kicked");
        }
        Some(conn)
    }

    pub fn online_count(&self) -> usize {
        self.registry.len()
    }

    /// Ask every connection to close. Returns how many were asked.
    pub fn shutdown_all(&self) -> usize {
        self.registry
            .outboxes()
            .filter(|outbox| outbox.shutdown())
            .count()
    }

    pub fn room_summaries(&self) -> Vec<RoomSummary> {
        self.directory
            .names()
            .into_iter()
            .map(|name| RoomSummary {
                members: self.registry.count_in(&name),
                history: self.directory.ring(&name).map_or(0, |ring| ring.len()),
                name,
            })
            .collect()
    }
}
