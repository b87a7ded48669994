//! UI 層
//!
//! axum のルーター、WebSocket / HTTP ハンドラー、グレースフルシャットダウン。

pub mod error;
pub mod handler;
pub mod server;
pub mod signal;
pub mod state;

pub use error::ServerError;
pub use server::Server;
