//! Conversion logic between DTOs and domain entities.

use parlor_shared::time::timestamp_to_rfc3339;

use crate::domain::{ChatEvent, Command, CommandKind, RoomSummary};
use crate::infrastructure::dto::{http, websocket as dto};

// ========================================
// DTO → Domain Entity
// ========================================

impl From<dto::CommandKindDto> for CommandKind {
    fn from(dto: dto::CommandKindDto) -> Self {
        match dto {
            dto::CommandKindDto::Administrative => Self::Administrative,
            dto::CommandKindDto::Broadcast => Self::Broadcast,
            dto::CommandKindDto::Rename => Self::Rename,
            dto::CommandKindDto::ListRooms => Self::ListRooms,
            dto::CommandKindDto::ChangeRoom => Self::ChangeRoom,
            dto::CommandKindDto::ListUsers => Self::ListUsers,
        }
    }
}

impl From<dto::CommandDto> for Command {
    fn from(dto: dto::CommandDto) -> Self {
        Self::new(dto.kind.into(), dto.text.trim())
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<ChatEvent> for dto::ChatEventDto {
    fn from(model: ChatEvent) -> Self {
        Self {
            timestamp: timestamp_to_rfc3339(model.timestamp.value()),
            sender_id: model.sender_id,
            text: model.text,
        }
    }
}

impl From<RoomSummary> for http::RoomSummaryDto {
    fn from(model: RoomSummary) -> Self {
        Self {
            name: model.name.into_string(),
            members: model.members,
            history: model.history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RoomName, Timestamp};

    #[test]
    fn test_dto_command_to_domain() {
        // テスト項目: DTO の CommandDto がドメインのコマンドに変換される
        // given (前提条件):
        let dto_cmd = dto::CommandDto {
            kind: dto::CommandKindDto::Rename,
            text: " alice ".to_string(),
        };

        // when (操作):
        let command: Command = dto_cmd.into();

        // then (期待する結果):
        assert_eq!(command, Command::new(CommandKind::Rename, "alice"));
    }

    #[test]
    fn test_domain_chat_event_to_dto() {
        // テスト項目: ChatEvent のタイムスタンプが RFC 3339 (UTC) で出力される
        // given (前提条件):
        let event = ChatEvent::new(
            Timestamp::new(1672531200123),
            "alice".to_string(),
            "hello".to_string(),
        );

        // when (操作):
        let dto_event: dto::ChatEventDto = event.into();

        // then (期待する結果):
        assert_eq!(dto_event.timestamp, "2023-01-01T00:00:00.123Z");
        assert_eq!(dto_event.sender_id, "alice");
        assert_eq!(dto_event.text, "hello");
    }

    #[test]
    fn test_domain_room_summary_to_dto() {
        // given (前提条件):
        let summary = RoomSummary {
            name: RoomName::new("vip".to_string()).unwrap(),
            members: 2,
            history: 5,
        };

        // when (操作):
        let dto_summary: http::RoomSummaryDto = summary.into();

        // then (期待する結果):
        assert_eq!(dto_summary.name, "vip");
        assert_eq!(dto_summary.members, 2);
        assert_eq!(dto_summary.history, 5);
    }
}
