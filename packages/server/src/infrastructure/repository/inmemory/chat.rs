//! InMemory Chat Repository 実装
//!
//! ドメイン層が定義する ChatRepository trait の具体的な実装。
//! `ChatState`（Registry と Room Directory）を 1 つの Mutex で保護します。
//!
//! ## ロックの規約
//!
//! - 各メソッドはロックを 1 回だけ取得し、操作全体をその区間で完了する
//! - ロック中に I/O は行わない（outbox への push は非ブロッキング）
//! - ロックの外からコンテナに触れる経路は存在しない
//! - ストアへの書き込みもロック中にキューへ積む（`try_send` なので待たない）。
//!   ストアはリングと同じ順序で追記を受け取り、ルーム削除は最後の追記の後になる

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{
        Broadcast, ChatEvent, ChatRepository, ChatState, ConnectionId, NickMap, NickRequest,
        Joined, NickVerdict, Nickname, Outbox, RegistryError, RoomError, RoomName, RoomSummary,
        Timestamp, User,
    },
    infrastructure::store::HistoryRecorder,
};

/// インメモリ Chat Repository 実装
pub struct InMemoryChatRepository {
    /// 共有状態（単一の排他ドメイン）
    state: Mutex<ChatState>,
    /// 永続化（ベストエフォート）。None ならストアへは書かない
    recorder: Option<HistoryRecorder>,
}

impl InMemoryChatRepository {
    /// 新しい InMemoryChatRepository を作成
    pub fn new(state: ChatState) -> Self {
        Self {
            state: Mutex::new(state),
            recorder: None,
        }
    }

    /// ルームと発言の書き込み先を設定する
    pub fn with_recorder(mut self, recorder: HistoryRecorder) -> Self {
        self.recorder = Some(recorder);
        self
    }
}

#[async_trait]
impl ChatRepository for InMemoryChatRepository {
    async fn connect(
        &self,
        conn: ConnectionId,
        nick: Nickname,
        outbox: Outbox,
    ) -> Result<Joined, RegistryError> {
        let mut state = self.state.lock().await;
        let joined = state.connect(conn, nick, outbox)?;
        tracing::debug!(
            "Connection {} registered as '{}' ({} online)",
            conn,
            joined.nick,
            state.online_count()
        );
        Ok(joined)
    }

    async fn disconnect(&self, conn: &ConnectionId) -> Option<User> {
        let mut state = self.state.lock().await;
        let user = state.disconnect(conn);
        tracing::debug!(
            "Connection {} unregistered ({} online)",
            conn,
            state.online_count()
        );
        user
    }

    async fn get_user(&self, conn: &ConnectionId) -> Option<User> {
        self.state.lock().await.user(conn)
    }

    async fn snapshot(&self) -> Vec<(ConnectionId, User)> {
        self.state.lock().await.snapshot()
    }

    async fn broadcast(
        &self,
        conn: &ConnectionId,
        text: String,
        timestamp: Timestamp,
    ) -> Result<Broadcast, RegistryError> {
        let mut state = self.state.lock().await;
        let broadcast = state.broadcast(conn, text, timestamp)?;
        if let Some(recorder) = &self.recorder {
            recorder.append(broadcast.room.clone(), broadcast.event.clone());
        }
        Ok(broadcast)
    }

    async fn rename(
        &self,
        conn: &ConnectionId,
        request: NickRequest<'_>,
        nick_map: &NickMap,
    ) -> Result<NickVerdict, RegistryError> {
        self.state.lock().await.rename(conn, &request, nick_map)
    }

    async fn change_room(
        &self,
        conn: &ConnectionId,
        room: &RoomName,
        timestamp: Timestamp,
    ) -> Result<usize, RegistryError> {
        self.state.lock().await.change_room(conn, room, timestamp)
    }

    async fn list_rooms(
        &self,
        conn: &ConnectionId,
    ) -> Result<(RoomName, Vec<RoomName>), RegistryError> {
        self.state.lock().await.list_rooms(conn)
    }

    async fn list_users(
        &self,
        conn: &ConnectionId,
    ) -> Result<(RoomName, Vec<Nickname>), RegistryError> {
        self.state.lock().await.list_users(conn)
    }

    async fn create_room(&self, name: RoomName) -> Result<(), RoomError> {
        let mut state = self.state.lock().await;
        state.create_room(name.clone())?;
        if let Some(recorder) = &self.recorder {
            recorder.create_room(name);
        }
        Ok(())
    }

    async fn remove_room(
        &self,
        name: &RoomName,
        timestamp: Timestamp,
    ) -> Result<Vec<ConnectionId>, RoomError> {
        let mut state = self.state.lock().await;
        let displaced = state.remove_room(name, timestamp)?;
        if let Some(recorder) = &self.recorder {
            recorder.delete_room(name.clone());
        }
        Ok(displaced)
    }

    async fn notify(&self, conn: &ConnectionId, event: ChatEvent) -> bool {
        self.state.lock().await.notify(conn, event)
    }

    async fn recent(&self, name: &RoomName) -> Result<Vec<ChatEvent>, RoomError> {
        self.state.lock().await.recent(name)
    }

    async fn kick(&self, nick: &str) -> Option<ConnectionId> {
        self.state.lock().await.kick(nick)
    }

    async fn online_count(&self) -> usize {
        self.state.lock().await.online_count()
    }

    async fn shutdown_all(&self) -> usize {
        self.state.lock().await.shutdown_all()
    }

    async fn room_summaries(&self) -> Vec<RoomSummary> {
        self.state.lock().await.room_summaries()
    }
}
