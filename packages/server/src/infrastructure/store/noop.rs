//! No-op message store used when no database is configured.
//!
//! All operations succeed but store nothing.

use async_trait::async_trait;

use crate::domain::{ChatEvent, MessageStore, RoomName, StoreError};

#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMessageStore;

#[async_trait]
impl MessageStore for NoOpMessageStore {
    async fn load_rooms(&self) -> Result<Vec<RoomName>, StoreError> {
        Ok(vec![])
    }

    async fn load_recent(
        &self,
        _room: &RoomName,
        _limit: usize,
    ) -> Result<Vec<ChatEvent>, StoreError> {
        Ok(vec![])
    }

    async fn create_room(&self, _room: &RoomName) -> Result<(), StoreError> {
        Ok(())
    }

    async fn delete_room(&self, _room: &RoomName) -> Result<(), StoreError> {
        Ok(())
    }

    async fn append(&self, _room: &RoomName, _event: &ChatEvent) -> Result<(), StoreError> {
        Ok(())
    }
}
