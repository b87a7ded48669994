//! Message store implementations and startup loading.

pub mod noop;
pub mod recorder;
pub mod sqlite;

pub use noop::NoOpMessageStore;
pub use recorder::{HistoryRecorder, StoreOp};
pub use sqlite::SqliteMessageStore;

use std::collections::BTreeSet;

use crate::domain::{MessageStore, RoomDirectory, RoomName, StoreError};

/// Build the Room Directory from the store.
///
/// The default room and every name in `extra_rooms` are created (and
/// persisted) when missing. Each ring is pre-filled with the newest
/// `history_len` stored events.
pub async fn load_directory(
    store: &dyn MessageStore,
    default_room: RoomName,
    extra_rooms: &[RoomName],
    history_len: usize,
) -> Result<RoomDirectory, StoreError> {
    let stored: BTreeSet<RoomName> = store.load_rooms().await?.into_iter().collect();

    let mut directory = RoomDirectory::new(default_room.clone(), history_len);
    let mut rooms = stored.clone();
    rooms.insert(default_room);
    rooms.extend(extra_rooms.iter().cloned());

    for name in rooms {
        if !stored.contains(&name) {
            store.create_room(&name).await?;
            tracing::info!("Room '{}' created", name);
        }
        let events = store.load_recent(&name, history_len).await?;
        tracing::debug!("Room '{}' restored with {} events", name, events.len());
        directory.restore(name, events);
    }

    Ok(directory)
}
