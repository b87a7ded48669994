//! Background persistence worker.
//!
//! The chat repository hands writes to [`HistoryRecorder`] with a
//! non-blocking `try_send` while it still holds the state lock, so the queue
//! order matches the order of the in-memory changes. A single task applies
//! them to the [`MessageStore`] in that order.
//! Persistence is best effort: a full queue or a failing store is logged and
//! never reaches the clients.

use std::sync::Arc;

use tokio::{sync::mpsc, task::JoinHandle};

use crate::domain::{ChatEvent, MessageStore, RoomName, StoreError};

/// One write for the message store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Append { room: RoomName, event: ChatEvent },
    CreateRoom(RoomName),
    DeleteRoom(RoomName),
}

#[derive(Debug, Clone)]
pub struct HistoryRecorder {
    tx: mpsc::Sender<StoreOp>,
}

impl HistoryRecorder {
    /// Capacity of the write queue.
    pub const QUEUE_CAPACITY: usize = 128;

    /// Start the worker task. It ends once every recorder clone is dropped
    /// and the queue is drained.
    pub fn spawn(store: Arc<dyn MessageStore>) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(Self::QUEUE_CAPACITY);
        let handle = tokio::spawn(run(store, rx));
        (Self { tx }, handle)
    }

    pub fn append(&self, room: RoomName, event: ChatEvent) {
        if event.is_synthetic() {
            tracing::debug!("Not persisting synthetic event in '{}'", room);
            return;
        }
        self.record(StoreOp::Append { room, event });
    }

    pub fn create_room(&self, room: RoomName) {
        self.record(StoreOp::CreateRoom(room));
    }

    pub fn delete_room(&self, room: RoomName) {
        self.record(StoreOp::DeleteRoom(room));
    }

    fn record(&self, op: StoreOp) {
        if let Err(e) = self.tx.try_send(op) {
            match e {
                mpsc::error::TrySendError::Full(op) => {
                    tracing::warn!("Store queue full, dropping {:?}", op);
                }
                mpsc::error::TrySendError::Closed(op) => {
                    tracing::warn!("Store worker stopped, dropping {:?}", op);
                }
            }
        }
    }
}

async fn run(store: Arc<dyn MessageStore>, mut rx: mpsc::Receiver<StoreOp>) {
    while let Some(op) = rx.recv().await {
        if let Err(e) = apply(store.as_ref(), &op).await {
            tracing::warn!("Failed to persist {:?}: {}", op, e);
        }
    }
    tracing::debug!("Store worker finished");
}

async fn apply(store: &dyn MessageStore, op: &StoreOp) -> Result<(), StoreError> {
    match op {
        StoreOp::Append { room, event } => store.append(room, event).await,
        StoreOp::CreateRoom(room) => store.create_room(room).await,
        StoreOp::DeleteRoom(room) => store.delete_room(room).await,
    }
}

#[cfg(test)]
mod tests {
    use mockall::Sequence;

    use super::*;
    use crate::domain::{Timestamp, store::MockMessageStore};

    fn room(name: &str) -> RoomName {
        RoomName::new(name.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_ops_are_applied_in_order() {
        // テスト項目: 書き込みがキュー投入順にストアへ適用される
        // given (前提条件):
        let mut store = MockMessageStore::new();
        let mut seq = Sequence::new();
        store
            .expect_create_room()
            .withf(|r| r.as_str() == "vip")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        store
            .expect_append()
            .withf(|r, e| r.as_str() == "vip" && e.text == "hi")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        store
            .expect_delete_room()
            .withf(|r| r.as_str() == "vip")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        let (recorder, handle) = HistoryRecorder::spawn(Arc::new(store));

        // when (操作):
        recorder.create_room(room("vip"));
        recorder.append(
            room("vip"),
            ChatEvent::new(Timestamp::new(1), "alice".to_string(), "hi".to_string()),
        );
        recorder.delete_room(room("vip"));
        drop(recorder);

        // then (期待する結果):
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_synthetic_events_are_not_persisted() {
        // given (前提条件):
        let mut store = MockMessageStore::new();
        store.expect_append().times(0);
        let (recorder, handle) = HistoryRecorder::spawn(Arc::new(store));

        // when (操作):
        recorder.append(room("general"), ChatEvent::system(Timestamp::new(1), "notice"));
        drop(recorder);

        // then (期待する結果):
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_store_failure_does_not_stop_worker() {
        // テスト項目: ストアの失敗後も後続の書き込みは適用される
        // given (前提条件):
        let mut store = MockMessageStore::new();
        store
            .expect_create_room()
            .withf(|r| r.as_str() == "broken")
            .times(1)
            .returning(|_| Err(StoreError::Database("disk full".to_string())));
        store
            .expect_create_room()
            .withf(|r| r.as_str() == "vip")
            .times(1)
            .returning(|_| Ok(()));
        let (recorder, handle) = HistoryRecorder::spawn(Arc::new(store));

        // when (操作):
        recorder.create_room(room("broken"));
        recorder.create_room(room("vip"));
        drop(recorder);

        // then (期待する結果):
        handle.await.unwrap();
    }
}
