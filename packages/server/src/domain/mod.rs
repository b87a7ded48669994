//! Domain layer: chat vocabulary, the shared state and its invariants.

pub mod command;
pub mod directory;
pub mod entity;
pub mod error;
pub mod history;
pub mod nick;
pub mod notice;
pub mod outbox;
pub mod registry;
pub mod repository;
pub mod state;
pub mod store;
pub mod value_object;

pub use command::{AdminCommand, Command, CommandKind};
pub use directory::{DEFAULT_ROOM, RoomDirectory};
pub use entity::{COW_SENDER, ChatEvent, SYSTEM_SENDER, User};
pub use error::{RegistryError, RoomError, StoreError, ValueObjectError};
pub use history::HistoryRing;
pub use nick::{NickMap, NickRequest, NickVerdict, verify_nick};
pub use outbox::{Outbound, Outbox, OutboxReceiver};
pub use registry::Registry;
pub use repository::ChatRepository;
pub use state::{Broadcast, ChatState, Joined, RoomSummary};
pub use store::MessageStore;
pub use value_object::{ConnectionId, Nickname, RoomName, Timestamp};
