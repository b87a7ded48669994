//! SQLite message store.
//!
//! Schema: one `rooms` table and one `messages` table keyed by room. Events
//! are read back in insertion order, which is the order they were broadcast.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use crate::domain::{ChatEvent, MessageStore, RoomName, StoreError, Timestamp};

const SCHEMA: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS rooms (name TEXT PRIMARY KEY NOT NULL)",
    "CREATE TABLE IF NOT EXISTS messages (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        room TEXT NOT NULL,
        timestamp INTEGER NOT NULL,
        sender_id TEXT NOT NULL,
        text TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS messages_room_id ON messages (room, id)",
];

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct SqliteMessageStore {
    pool: SqlitePool,
}

impl SqliteMessageStore {
    /// Connection acquire timeout.
    const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Open (or create) the database at `path` and apply the schema.
    ///
    /// `:memory:` opens a private in-memory database on a single connection.
    pub async fn connect(path: &str) -> Result<Self, StoreError> {
        let pool = if path == ":memory:" {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .acquire_timeout(Self::ACQUIRE_TIMEOUT)
                .connect_with(SqliteConnectOptions::new().in_memory(true))
                .await?
        } else {
            let options = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true);
            SqlitePoolOptions::new()
                .max_connections(4)
                .acquire_timeout(Self::ACQUIRE_TIMEOUT)
                .connect_with(options)
                .await?
        };

        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }

        tracing::info!("Message store opened at {}", path);
        Ok(Self { pool })
    }
}

#[async_trait]
impl MessageStore for SqliteMessageStore {
    async fn load_rooms(&self) -> Result<Vec<RoomName>, StoreError> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT name FROM rooms ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter()
            .map(|(name,)| {
                RoomName::new(name).map_err(|e| StoreError::InvalidRecord(e.to_string()))
            })
            .collect()
    }

    async fn load_recent(
        &self,
        room: &RoomName,
        limit: usize,
    ) -> Result<Vec<ChatEvent>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<(i64, String, String)> = sqlx::query_as(
            "SELECT timestamp, sender_id, text FROM messages
             WHERE room = ? ORDER BY id DESC LIMIT ?",
        )
        .bind(room.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .rev()
            .map(|(timestamp, sender_id, text)| {
                ChatEvent::new(Timestamp::new(timestamp), sender_id, text)
            })
            .collect())
    }

    async fn create_room(&self, room: &RoomName) -> Result<(), StoreError> {
        sqlx::query("INSERT OR IGNORE INTO rooms (name) VALUES (?)")
            .bind(room.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_room(&self, room: &RoomName) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM rooms WHERE name = ?")
            .bind(room.as_str())
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM messages WHERE room = ?")
            .bind(room.as_str())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn append(&self, room: &RoomName, event: &ChatEvent) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO messages (room, timestamp, sender_id, text) VALUES (?, ?, ?, ?)")
            .bind(room.as_str())
            .bind(event.timestamp.value())
            .bind(event.sender_id.as_str())
            .bind(event.text.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(name: &str) -> RoomName {
        RoomName::new(name.to_string()).unwrap()
    }

    fn event(ts: i64, text: &str) -> ChatEvent {
        ChatEvent::new(Timestamp::new(ts), "alice".to_string(), text.to_string())
    }

    #[tokio::test]
    async fn test_rooms_round_trip_and_create_is_idempotent() {
        // given (前提条件):
        let store = SqliteMessageStore::connect(":memory:").await.unwrap();

        // when (操作):
        store.create_room(&room("vip")).await.unwrap();
        store.create_room(&room("general")).await.unwrap();
        store.create_room(&room("vip")).await.unwrap();

        // then (期待する結果):
        assert_eq!(
            store.load_rooms().await.unwrap(),
            vec![room("general"), room("vip")]
        );
    }

    #[tokio::test]
    async fn test_load_recent_returns_newest_in_send_order() {
        // テスト項目: 最新 limit 件が送信順で返される
        // given (前提条件):
        let store = SqliteMessageStore::connect(":memory:").await.unwrap();
        store.create_room(&room("general")).await.unwrap();
        // timestamps deliberately out of order; insertion order wins
        for (ts, text) in [(30, "a"), (10, "b"), (20, "c"), (40, "d")] {
            store.append(&room("general"), &event(ts, text)).await.unwrap();
        }
        store.append(&room("vip"), &event(50, "elsewhere")).await.unwrap();

        // when (操作):
        let recent = store.load_recent(&room("general"), 3).await.unwrap();

        // then (期待する結果):
        let texts: Vec<&str> = recent.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["b", "c", "d"]);
        assert_eq!(recent[0].timestamp, Timestamp::new(10));
        assert_eq!(recent[0].sender_id, "alice");
    }

    #[tokio::test]
    async fn test_delete_room_removes_messages() {
        // given (前提条件):
        let store = SqliteMessageStore::connect(":memory:").await.unwrap();
        store.create_room(&room("vip")).await.unwrap();
        store.append(&room("vip"), &event(1, "a")).await.unwrap();

        // when (操作):
        store.delete_room(&room("vip")).await.unwrap();

        // then (期待する結果):
        assert!(store.load_rooms().await.unwrap().is_empty());
        assert!(store.load_recent(&room("vip"), 10).await.unwrap().is_empty());
    }
}
