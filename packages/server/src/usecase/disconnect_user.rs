//! UseCase: ユーザー切断処理

use std::sync::Arc;

use crate::domain::{ChatRepository, ConnectionId, User};

/// ユーザー切断のユースケース
pub struct DisconnectUserUseCase {
    repository: Arc<dyn ChatRepository>,
}

impl DisconnectUserUseCase {
    pub fn new(repository: Arc<dyn ChatRepository>) -> Self {
        Self { repository }
    }

    /// 接続を登録解除し、最後の状態を返す（未登録なら `None`）
    pub async fn execute(&self, conn: &ConnectionId) -> Option<User> {
        self.repository.disconnect(conn).await
    }
}
