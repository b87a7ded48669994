//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{RegistryError, ValueObjectError};

/// 接続処理のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectError {
    #[error("registration failed: {0}")]
    Registry(#[from] RegistryError),
    #[error("invalid placeholder nick: {0}")]
    Nickname(#[from] ValueObjectError),
}

/// コマンド処理のエラー
///
/// ポリシー上の拒否（無効なニックネーム、存在しないルームなど）はエラーではなく、
/// 送信者へのシステムイベントとして返される。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("dispatch failed: {0}")]
    Registry(#[from] RegistryError),
}
