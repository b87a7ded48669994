//! In-memory repository implementations.

pub mod chat;

pub use chat::InMemoryChatRepository;
