//! UseCase: ユーザー接続処理
//!
//! 新しい接続をデフォルトルームに登録し、そのルームの履歴を outbox に再生する。
//! ニックネームの初期値はリモートポート番号（取得できない場合は `guest<n>`）。
//! 既に使われている場合は、登録と同じロック区間で連番が付けられる。

use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use crate::domain::{ChatRepository, ConnectionId, Nickname, Outbox};

use super::error::ConnectError;

/// 接続完了時の情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connected {
    pub nick: Nickname,
    /// 再生した履歴の件数
    pub replayed: usize,
}

/// ユーザー接続のユースケース
pub struct ConnectUserUseCase {
    /// Repository（共有状態へのアクセス）
    repository: Arc<dyn ChatRepository>,
    /// `guest<n>` 用の連番
    guests: AtomicUsize,
}

impl ConnectUserUseCase {
    /// 新しい ConnectUserUseCase を作成
    pub fn new(repository: Arc<dyn ChatRepository>) -> Self {
        Self {
            repository,
            guests: AtomicUsize::new(0),
        }
    }

    /// 接続を実行
    ///
    /// # Arguments
    ///
    /// * `conn` - 新しい接続の ID
    /// * `remote` - リモートアドレス（仮ニックネームの生成に使用）
    /// * `outbox` - この接続への送信キュー
    pub async fn execute(
        &self,
        conn: ConnectionId,
        remote: Option<SocketAddr>,
        outbox: Outbox,
    ) -> Result<Connected, ConnectError> {
        let placeholder = self.placeholder_nick(remote)?;
        let joined = self.repository.connect(conn, placeholder, outbox).await?;
        Ok(Connected {
            nick: joined.nick,
            replayed: joined.replayed,
        })
    }

    fn placeholder_nick(&self, remote: Option<SocketAddr>) -> Result<Nickname, ConnectError> {
        let nick = match remote.map(|addr| addr.port()) {
            Some(port) if port != 0 => port.to_string(),
            _ => format!("guest{}", self.guests.fetch_add(1, Ordering::Relaxed) + 1),
        };
        Ok(Nickname::new(nick)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            ChatEvent, ChatState, DEFAULT_ROOM, Outbound, RegistryError, RoomDirectory, RoomName,
            Timestamp,
        },
        infrastructure::repository::InMemoryChatRepository,
    };

    fn create_test_repository() -> Arc<InMemoryChatRepository> {
        let room = RoomName::new(DEFAULT_ROOM.to_string()).unwrap();
        Arc::new(InMemoryChatRepository::new(ChatState::new(RoomDirectory::new(
            room, 10,
        ))))
    }

    #[tokio::test]
    async fn test_connect_uses_remote_port_as_nick() {
        // テスト項目: リモートポートが仮ニックネームになる
        // given (前提条件):
        let repository = create_test_repository();
        let usecase = ConnectUserUseCase::new(repository.clone());
        let conn = ConnectionId::generate();
        let (outbox, _rx) = Outbox::channel();

        // when (操作):
        let result = usecase
            .execute(conn, Some("127.0.0.1:54321".parse().unwrap()), outbox)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(result.nick.as_str(), "54321");
        let user = repository.get_user(&conn).await.unwrap();
        assert_eq!(user.room.as_str(), "general");
    }

    #[tokio::test]
    async fn test_same_remote_port_gets_distinct_nicks() {
        // テスト項目: 別ホストから同じポート番号で接続しても、仮ニックネームは重複しない
        // given (前提条件):
        let repository = create_test_repository();
        let usecase = ConnectUserUseCase::new(repository.clone());
        let (first, _rx1) = Outbox::channel();
        let (second, _rx2) = Outbox::channel();

        // when (操作):
        let a = usecase
            .execute(ConnectionId::generate(), Some("10.0.0.1:40000".parse().unwrap()), first)
            .await
            .unwrap();
        let b = usecase
            .execute(ConnectionId::generate(), Some("10.0.0.2:40000".parse().unwrap()), second)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(a.nick.as_str(), "40000");
        assert_eq!(b.nick.as_str(), "400002");
        assert!(repository.kick("400002").await.is_some());
    }

    #[tokio::test]
    async fn test_connect_without_address_uses_guest_nicks() {
        // given (前提条件):
        let usecase = ConnectUserUseCase::new(create_test_repository());
        let (first, _rx1) = Outbox::channel();
        let (second, _rx2) = Outbox::channel();

        // when (操作):
        let a = usecase.execute(ConnectionId::generate(), None, first).await.unwrap();
        let b = usecase.execute(ConnectionId::generate(), None, second).await.unwrap();

        // then (期待する結果):
        assert_eq!(a.nick.as_str(), "guest1");
        assert_eq!(b.nick.as_str(), "guest2");
    }

    #[tokio::test]
    async fn test_connect_replays_default_room_history() {
        // テスト項目: 接続時にデフォルトルームの履歴が再生される
        // given (前提条件):
        let repository = create_test_repository();
        let usecase = ConnectUserUseCase::new(repository.clone());
        let sender = ConnectionId::generate();
        let (outbox, _rx) = Outbox::channel();
        let first = usecase.execute(sender, None, outbox).await.unwrap();
        repository
            .broadcast(&sender, "hello".to_string(), Timestamp::new(1))
            .await
            .unwrap();
        assert_eq!(first.replayed, 0);

        // when (操作):
        let (outbox, mut rx) = Outbox::channel();
        let second = usecase.execute(ConnectionId::generate(), None, outbox).await.unwrap();

        // then (期待する結果):
        assert_eq!(second.replayed, 1);
        assert_eq!(
            rx.recv().await,
            Some(Outbound::Event(ChatEvent::new(
                Timestamp::new(1),
                "guest1".to_string(),
                "hello".to_string()
            )))
        );
    }

    #[tokio::test]
    async fn test_duplicate_connection_id_is_rejected() {
        // テスト項目: 同じ接続 ID での二重登録はエラー
        // given (前提条件):
        let usecase = ConnectUserUseCase::new(create_test_repository());
        let conn = ConnectionId::generate();
        let (outbox, _rx) = Outbox::channel();
        usecase.execute(conn, None, outbox).await.unwrap();

        // when (操作):
        let (outbox, _rx2) = Outbox::channel();
        let result = usecase.execute(conn, None, outbox).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(ConnectError::Registry(RegistryError::DuplicateConnection(conn)))
        );
    }
}
