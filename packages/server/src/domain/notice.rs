//! Texts of the system events sent back to clients.

use super::{command::AdminCommand, value_object::RoomName};

pub const UNRECOGNISED_COMMAND: &str = "Unrecognised command, use /man for more info";

pub fn created_room(room: &RoomName) -> String {
    format!("Created room: {room}")
}

pub fn room_exists(room: &RoomName) -> String {
    format!("Room exists: {room}")
}

pub fn deleted_room(room: &RoomName) -> String {
    format!("Deleted room: {room}")
}

pub fn room_does_not_exist(room: &RoomName) -> String {
    format!("Room does not exist: {room}")
}

pub fn cannot_delete_default(room: &RoomName) -> String {
    format!("Cannot delete default room: {room}")
}

pub fn displaced(default_room: &RoomName) -> String {
    format!("room deleted, reconnected to {default_room}")
}

pub fn kicked(nick: &str) -> String {
    format!("Kicked: {nick}")
}

pub fn not_found(nick: &str) -> String {
    format!("Not found: {nick}")
}

pub fn online(count: usize) -> String {
    format!("Online: {count}")
}

pub fn help() -> String {
    format!("Available commands: {}", AdminCommand::NAMES.join(", "))
}

pub fn invalid_command(text: &str) -> String {
    format!("Invalid command: {text}")
}

pub fn nick_set(nick: &str) -> String {
    format!("nick set: {nick}")
}

pub fn nick_in_use(nick: &str) -> String {
    format!("nick in use: {nick}")
}

pub fn invalid_nick(nick: &str) -> String {
    format!("invalid nick: {nick}")
}

pub fn room_listing(current: &RoomName, rooms: &[RoomName]) -> String {
    format!("connected to: {current}, available: {}", join(rooms))
}

pub fn connected_to(room: &RoomName) -> String {
    format!("connected to: {room}")
}

pub fn invalid_room(room: &str) -> String {
    format!("unchanged, invalid room: {room}")
}

pub fn users_in<T: std::fmt::Display>(room: &RoomName, nicks: &[T]) -> String {
    format!("users in {room}: {}", join(nicks))
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
