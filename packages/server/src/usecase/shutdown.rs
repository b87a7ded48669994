//! UseCase: シャットダウン処理
//!
//! 全接続に切断を要求し、レジストリが空になるか猶予時間が切れるまで待つ。

use std::{sync::Arc, time::Duration};

use crate::domain::ChatRepository;

/// 空になったかを確認する間隔
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// シャットダウンのユースケース
pub struct ShutdownUseCase {
    repository: Arc<dyn ChatRepository>,
}

impl ShutdownUseCase {
    pub fn new(repository: Arc<dyn ChatRepository>) -> Self {
        Self { repository }
    }

    /// 切断を要求して待機する
    ///
    /// # Returns
    ///
    /// 猶予時間の経過後も残っていた接続数（全員切断できれば 0）
    pub async fn execute(&self, grace: Duration) -> usize {
        let asked = self.repository.shutdown_all().await;
        tracing::info!("Asked {} connections to close", asked);

        let drained = tokio::time::timeout(grace, async {
            while self.repository.online_count().await > 0 {
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        })
        .await;

        match drained {
            Ok(()) => 0,
            Err(_) => {
                let remaining = self.repository.online_count().await;
                tracing::warn!(
                    "{} connections still open after {:?}, dropping them",
                    remaining,
                    grace
                );
                remaining
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            ChatState, ConnectionId, DEFAULT_ROOM, Nickname, Outbound, Outbox, RoomDirectory,
            RoomName,
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
    async fn test_shutdown_waits_for_connections_to_leave() {
        // テスト項目: 切断要求を受けた接続が抜けると 0 を返す
        // given (前提条件):
        let repository = create_test_repository();
        let conn = ConnectionId::generate();
        let (outbox, mut rx) = Outbox::channel();
        repository
            .connect(conn, Nickname::new("alice".to_string()).unwrap(), outbox)
            .await
            .unwrap();
        let leaver = repository.clone();
        tokio::spawn(async move {
            if rx.recv().await == Some(Outbound::Shutdown) {
                leaver.disconnect(&conn).await;
            }
        });
        let usecase = ShutdownUseCase::new(repository);

        // when (操作):
        let remaining = usecase.execute(Duration::from_secs(5)).await;

        // then (期待する結果):
        assert_eq!(remaining, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_gives_up_after_grace_period() {
        // テスト項目: 応答しない接続は猶予時間後に残数として報告される
        // given (前提条件):
        let repository = create_test_repository();
        let (outbox, _rx) = Outbox::channel();
        repository
            .connect(
                ConnectionId::generate(),
                Nickname::new("stuck".to_string()).unwrap(),
                outbox,
            )
            .await
            .unwrap();
        let usecase = ShutdownUseCase::new(repository);

        // when (操作):
        let remaining = usecase.execute(Duration::from_secs(1)).await;

        // then (期待する結果):
        assert_eq!(remaining, 1);
    }
}
