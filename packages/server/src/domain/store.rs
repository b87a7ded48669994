//! Persistence sink for rooms and chat history.
//!
//! The hot broadcast path never waits on a store; writes go through
//! [`HistoryRecorder`](crate::infrastructure::store::HistoryRecorder).

use async_trait::async_trait;

use super::{ChatEvent, RoomName, StoreError};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Names of all persisted rooms.
    async fn load_rooms(&self) -> Result<Vec<RoomName>, StoreError>;

    /// The newest `limit` events of `room`, oldest first.
    async fn load_recent(&self, room: &RoomName, limit: usize)
    -> Result<Vec<ChatEvent>, StoreError>;

    async fn create_room(&self, room: &RoomName) -> Result<(), StoreError>;

    /// Remove the room together with its stored events.
    async fn delete_room(&self, room: &RoomName) -> Result<(), StoreError>;

    async fn append(&self, room: &RoomName, event: &ChatEvent) -> Result<(), StoreError>;
}
