//! UseCase: ルーム一覧取得

use std::sync::Arc;

use crate::domain::{ChatRepository, RoomSummary};

/// ルーム一覧取得のユースケース
pub struct GetRoomsUseCase {
    repository: Arc<dyn ChatRepository>,
}

impl GetRoomsUseCase {
    pub fn new(repository: Arc<dyn ChatRepository>) -> Self {
        Self { repository }
    }

    /// 全ルームの概要（名前順）を返す
    pub async fn execute(&self) -> Vec<RoomSummary> {
        self.repository.room_summaries().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ChatState, ConnectionId, DEFAULT_ROOM, Nickname, Outbox, RoomDirectory, RoomName, Timestamp},
        infrastructure::repository::InMemoryChatRepository,
    };

    #[tokio::test]
    async fn test_get_rooms_reports_members_and_history() {
        // テスト項目: ルームごとのメンバー数と履歴数が返される
        // given (前提条件):
        let general = RoomName::new(DEFAULT_ROOM.to_string()).unwrap();
        let repository = Arc::new(InMemoryChatRepository::new(ChatState::new(
            RoomDirectory::new(general.clone(), 10),
        )));
        let vip = RoomName::new("vip".to_string()).unwrap();
        repository.create_room(vip.clone()).await.unwrap();
        let conn = ConnectionId::generate();
        let (outbox, _rx) = Outbox::channel();
        repository
            .connect(conn, Nickname::new("alice".to_string()).unwrap(), outbox)
            .await
            .unwrap();
        repository
            .broadcast(&conn, "hi".to_string(), Timestamp::new(1))
            .await
            .unwrap();
        let usecase = GetRoomsUseCase::new(repository);

        // when (操作):
        let rooms = usecase.execute().await;

        // then (期待する結果):
        assert_eq!(
            rooms,
            vec![
                RoomSummary { name: general, members: 1, history: 1 },
                RoomSummary { name: vip, members: 0, history: 0 },
            ]
        );
    }
}
