//! UseCase 層
//!
//! Domain 層の trait（ChatRepository）にのみ依存し、
//! 接続・切断・コマンド処理・シャットダウンのアプリケーションロジックを提供する。

pub mod connect_user;
pub mod disconnect_user;
pub mod dispatch_command;
pub mod error;
pub mod get_rooms;
pub mod shutdown;

pub use connect_user::{ConnectUserUseCase, Connected};
pub use disconnect_user::DisconnectUserUseCase;
pub use dispatch_command::DispatchCommandUseCase;
pub use error::{ConnectError, DispatchError};
pub use get_rooms::GetRoomsUseCase;
pub use shutdown::ShutdownUseCase;
