//! Repository trait 定義
//!
//! 共有チャット状態（Registry と Room Directory）へのインターフェース。
//! 各メソッドは 1 回のロック区間で完結するアトミックな操作です。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{
    ChatEvent, ConnectionId, NickMap, NickRequest, NickVerdict, Nickname, Outbox,
    RegistryError, RoomError, RoomName, Timestamp, User,
    state::{Broadcast, Joined, RoomSummary},
};

/// Chat Repository trait
///
/// UseCase 層はこの trait に依存し、ロックやコンテナには直接触れない。
#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// 接続を登録し、デフォルトルームの履歴を outbox に再生する
    ///
    /// 仮ニックネームが使用中なら連番を付けて一意にする
    async fn connect(
        &self,
        conn: ConnectionId,
        nick: Nickname,
        outbox: Outbox,
    ) -> Result<Joined, RegistryError>;

    /// 接続を登録解除
    async fn disconnect(&self, conn: &ConnectionId) -> Option<User>;

    /// 接続中のユーザーを取得
    async fn get_user(&self, conn: &ConnectionId) -> Option<User>;

    /// 全接続のスナップショットを取得
    async fn snapshot(&self) -> Vec<(ConnectionId, User)>;

    /// 送信者のルームに追記し、同室の全接続へ配信
    async fn broadcast(
        &self,
        conn: &ConnectionId,
        text: String,
        timestamp: Timestamp,
    ) -> Result<Broadcast, RegistryError>;

    /// ニックネームの検証と割り当てを 1 ステップで行う
    async fn rename(
        &self,
        conn: &ConnectionId,
        request: NickRequest<'_>,
        nick_map: &NickMap,
    ) -> Result<NickVerdict, RegistryError>;

    /// ルームを移動し、確認と履歴を outbox に送る
    async fn change_room(
        &self,
        conn: &ConnectionId,
        room: &RoomName,
        timestamp: Timestamp,
    ) -> Result<usize, RegistryError>;

    /// 現在のルームと全ルーム名
    async fn list_rooms(
        &self,
        conn: &ConnectionId,
    ) -> Result<(RoomName, Vec<RoomName>), RegistryError>;

    /// 現在のルームと同室のニックネーム
    async fn list_users(
        &self,
        conn: &ConnectionId,
    ) -> Result<(RoomName, Vec<Nickname>), RegistryError>;

    /// ルームを作成
    async fn create_room(&self, name: RoomName) -> Result<(), RoomError>;

    /// ルームを削除し、メンバーをデフォルトルームへ移動
    async fn remove_room(
        &self,
        name: &RoomName,
        timestamp: Timestamp,
    ) -> Result<Vec<ConnectionId>, RoomError>;

    /// 1 つの接続にだけイベントを送る（送信者への返信）
    async fn notify(&self, conn: &ConnectionId, event: ChatEvent) -> bool;

    /// ルームの直近履歴を取得
    async fn recent(&self, name: &RoomName) -> Result<Vec<ChatEvent>, RoomError>;

    /// ニックネームで接続を探し、切断を要求
    async fn kick(&self, nick: &str) -> Option<ConnectionId>;

    /// 接続数を取得
    async fn online_count(&self) -> usize;

    /// 全接続に切断を要求
    async fn shutdown_all(&self) -> usize;

    /// 全ルームの概要を取得
    async fn room_summaries(&self) -> Vec<RoomSummary>;
}
