//! UseCase: コマンド処理（Command Dispatcher）
//!
//! 1 つの受信コマンドを 1 回の遷移として処理する。
//! 共有状態の変更は ChatRepository の 1 操作（1 ロック区間）で完結し、
//! 送信者への返信は同じ接続の outbox に積まれる。
//!
//! ## 遷移の概要
//!
//! - administrative: 管理者ニックネームのみ。create / delete / kick / count / help
//! - broadcast: 空でなければ送信者のルームに追記し、同室の全員へ配信
//! - rename: 検証と割り当てをアトミックに実行
//! - list-rooms / list-users: 読み取りのみ
//! - change-room: 存在するルームのみ。確認の後に履歴を再生
//!
//! ルーム削除では、移動させられたユーザーへの通知が先に積まれ、
//! 管理者への確認はその後に送られる。

use std::sync::Arc;

use parlor_shared::time::Clock;

use crate::domain::{
    AdminCommand, ChatEvent, ChatRepository, Command, CommandKind, ConnectionId, NickMap,
    NickRequest, NickVerdict, Nickname, RegistryError, RoomError, RoomName, Timestamp, notice,
};

use super::error::DispatchError;

/// コマンド処理のユースケース
pub struct DispatchCommandUseCase {
    /// Repository（共有状態へのアクセス）
    repository: Arc<dyn ChatRepository>,
    /// 起動時に読み込んだニックネーム/パスワード表
    nick_map: NickMap,
    /// 管理コマンドを許可するニックネーム
    admin: Nickname,
    clock: Arc<dyn Clock>,
}

impl DispatchCommandUseCase {
    /// 新しい DispatchCommandUseCase を作成
    pub fn new(
        repository: Arc<dyn ChatRepository>,
        nick_map: NickMap,
        admin: Nickname,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            nick_map,
            admin,
            clock,
        }
    }

    /// コマンドを 1 つ処理する
    ///
    /// # Returns
    ///
    /// * `Ok(())` - 処理完了（ポリシー上の拒否も含む）
    /// * `Err(DispatchError)` - 接続が登録されていない
    pub async fn execute(&self, conn: &ConnectionId, command: Command) -> Result<(), DispatchError> {
        tracing::debug!("Dispatching {:?} from {}", command.kind, conn);
        match command.kind {
            CommandKind::Administrative => self.administrative(conn, &command.text).await,
            CommandKind::Broadcast => self.broadcast(conn, command.text).await,
            CommandKind::Rename => self.rename(conn, &command.text).await,
            CommandKind::ListRooms => self.list_rooms(conn).await,
            CommandKind::ChangeRoom => self.change_room(conn, &command.text).await,
            CommandKind::ListUsers => self.list_users(conn).await,
        }
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }

    /// 送信者にだけシステムイベントを返す
    async fn reply(&self, conn: &ConnectionId, text: String) -> Result<(), DispatchError> {
        let event = ChatEvent::system(self.now(), text);
        if !self.repository.notify(conn, event).await {
            return Err(RegistryError::UnknownConnection(*conn).into());
        }
        Ok(())
    }

    async fn broadcast(&self, conn: &ConnectionId, text: String) -> Result<(), DispatchError> {
        if text.trim().is_empty() {
            tracing::debug!("Dropping empty broadcast from {}", conn);
            return Ok(());
        }
        let broadcast = self.repository.broadcast(conn, text, self.now()).await?;
        tracing::debug!(
            "Broadcast in '{}' delivered to {} connections",
            broadcast.room,
            broadcast.delivered
        );
        Ok(())
    }

    async fn rename(&self, conn: &ConnectionId, text: &str) -> Result<(), DispatchError> {
        let request = NickRequest::parse(text);
        let name = request.name.to_string();
        let verdict = self.repository.rename(conn, request, &self.nick_map).await?;
        let reply = match verdict {
            NickVerdict::Ok(nick) => {
                tracing::info!("Connection {} is now '{}'", conn, nick);
                notice::nick_set(nick.as_str())
            }
            NickVerdict::Used => notice::nick_in_use(&name),
            NickVerdict::Invalid => {
                tracing::info!("Rejected nick '{}' for {}", name, conn);
                notice::invalid_nick(&name)
            }
        };
        self.reply(conn, reply).await
    }

    async fn list_rooms(&self, conn: &ConnectionId) -> Result<(), DispatchError> {
        let (current, rooms) = self.repository.list_rooms(conn).await?;
        self.reply(conn, notice::room_listing(&current, &rooms)).await
    }

    async fn list_users(&self, conn: &ConnectionId) -> Result<(), DispatchError> {
        let (room, nicks) = self.repository.list_users(conn).await?;
        self.reply(conn, notice::users_in(&room, &nicks)).await
    }

    async fn change_room(&self, conn: &ConnectionId, text: &str) -> Result<(), DispatchError> {
        let Ok(room) = RoomName::new(text.to_string()) else {
            return self.reply(conn, notice::invalid_room(text)).await;
        };
        match self.repository.change_room(conn, &room, self.now()).await {
            Ok(replayed) => {
                tracing::info!("Connection {} moved to '{}' ({} replayed)", conn, room, replayed);
                Ok(())
            }
            Err(RegistryError::Room(RoomError::NotFound(_))) => {
                self.reply(conn, notice::invalid_room(text)).await
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn administrative(&self, conn: &ConnectionId, text: &str) -> Result<(), DispatchError> {
        let user = self
            .repository
            .get_user(conn)
            .await
            .ok_or(RegistryError::UnknownConnection(*conn))?;
        if user.nick != self.admin {
            tracing::info!("Non-admin '{}' tried an administrative command", user.nick);
            return self
                .reply(conn, notice::UNRECOGNISED_COMMAND.to_string())
                .await;
        }

        let Some(admin_command) = AdminCommand::parse(text) else {
            return self.reply(conn, notice::invalid_command(text)).await;
        };
        tracing::info!("Admin command: {:?}", admin_command);

        let reply = match admin_command {
            AdminCommand::Create(room) => match self.repository.create_room(room.clone()).await {
                Ok(()) => notice::created_room(&room),
                Err(_) => notice::room_exists(&room),
            },
            AdminCommand::Delete(room) => {
                match self.repository.remove_room(&room, self.now()).await {
                    Ok(displaced) => {
                        tracing::info!("Room '{}' deleted, {} users displaced", room, displaced.len());
                        notice::deleted_room(&room)
                    }
                    Err(RoomError::Protected(_)) => notice::cannot_delete_default(&room),
                    Err(_) => notice::room_does_not_exist(&room),
                }
            }
            AdminCommand::Kick(nick) => match self.repository.kick(&nick).await {
                Some(target) => {
                    tracing::info!("Kicked '{}' ({})", nick, target);
                    notice::kicked(&nick)
                }
                None => notice::not_found(&nick),
            },
            AdminCommand::Count => notice::online(self.repository.online_count().await),
            AdminCommand::Help => notice::help(),
        };
        self.reply(conn, reply).await
    }
}
