//! Infrastructure 層
//!
//! Domain 層の trait の具体的な実装（インメモリ状態、メッセージストア）、
//! DTO とその変換、起動時の設定ファイル読み込みを提供する。

pub mod dto;
pub mod nick_map;
pub mod repository;
pub mod store;
