//! Server configuration.
//!
//! Command line arguments are parsed with `clap` into [`Args`] and validated
//! into a [`ServerConfig`]. Anything that fails validation is a
//! [`ConfigError`] and stops the process at startup.

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use thiserror::Error;

use crate::{
    domain::{DEFAULT_ROOM, NickMap, Nickname, RoomName, ValueObjectError},
    infrastructure::nick_map::load_nick_map,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed nick map {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid admin nick: {0}")]
    Admin(ValueObjectError),
    #[error("invalid room: {0}")]
    Room(ValueObjectError),
    #[error("history length must be at least 1")]
    HistoryLen,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "parlor-server")]
#[command(about = "Room-based WebSocket chat server", long_about = None)]
pub struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    pub port: u16,

    /// Nick allowed to run administrative commands
    #[arg(short = 'a', long, default_value = "admin")]
    pub admin: String,

    /// Number of recent events kept per room
    #[arg(long, default_value = "10")]
    pub history_len: usize,

    /// JSON file mapping reserved nicks to passwords
    #[arg(short = 'n', long, value_name = "FILE")]
    pub nick_map: Option<PathBuf>,

    /// SQLite database for rooms and history
    #[arg(long, value_name = "FILE")]
    pub database: Option<PathBuf>,

    /// Extra room to create at startup (repeatable)
    #[arg(long = "room", value_name = "NAME")]
    pub rooms: Vec<String>,

    /// Seconds to wait for connections to close on shutdown
    #[arg(long, default_value = "10")]
    pub shutdown_grace_secs: u64,
}

/// Validated server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub admin: Nickname,
    pub history_len: usize,
    pub nick_map: NickMap,
    pub database: Option<PathBuf>,
    pub default_room: RoomName,
    pub rooms: Vec<RoomName>,
    pub shutdown_grace: Duration,
}

impl ServerConfig {
    /// Configuration with defaults for everything but the bind address.
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self, ConfigError> {
        Self::try_from(Args {
            host: host.into(),
            port,
            admin: "admin".to_string(),
            history_len: 10,
            nick_map: None,
            database: None,
            rooms: Vec::new(),
            shutdown_grace_secs: 10,
        })
    }
}

impl TryFrom<Args> for ServerConfig {
    type Error = ConfigError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        if args.history_len == 0 {
            return Err(ConfigError::HistoryLen);
        }
        let admin = Nickname::new(args.admin).map_err(ConfigError::Admin)?;
        let rooms = args
            .rooms
            .into_iter()
            .map(|name| RoomName::new(name).map_err(ConfigError::Room))
            .collect::<Result<Vec<_>, _>>()?;
        let default_room =
            RoomName::new(DEFAULT_ROOM.to_string()).map_err(ConfigError::Room)?;
        let nick_map = load_nick_map(args.nick_map.as_deref())?;

        Ok(Self {
            host: args.host,
            port: args.port,
            admin,
            history_len: args.history_len,
            nick_map,
            database: args.database,
            default_room,
            rooms,
            shutdown_grace: Duration::from_secs(args.shutdown_grace_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        // テスト項目: 引数なしで既定値が使われる
        // given (前提条件):
        let args = Args::try_parse_from(["parlor-server"]).unwrap();

        // when (操作):
        let config = ServerConfig::try_from(args).unwrap();

        // then (期待する結果):
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.admin.as_str(), "admin");
        assert_eq!(config.history_len, 10);
        assert!(config.nick_map.is_empty());
        assert!(config.database.is_none());
        assert_eq!(config.default_room.as_str(), "general");
        assert!(config.rooms.is_empty());
        assert_eq!(config.shutdown_grace, Duration::from_secs(10));
    }

    #[test]
    fn test_repeatable_rooms() {
        // given (前提条件):
        let args =
            Args::try_parse_from(["parlor-server", "--room", "vip", "--room", "random"]).unwrap();

        // when (操作):
        let config = ServerConfig::try_from(args).unwrap();

        // then (期待する結果):
        let names: Vec<&str> = config.rooms.iter().map(RoomName::as_str).collect();
        assert_eq!(names, vec!["vip", "random"]);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        // テスト項目: 不正な値は ConfigError になる
        // given (前提条件):
        let cases = [
            vec!["parlor-server", "--history-len", "0"],
            vec!["parlor-server", "--admin", "not valid"],
            vec!["parlor-server", "--room", "bad room"],
            vec!["parlor-server", "--nick-map", "/nonexistent/nicks.json"],
        ];

        for case in cases {
            // when (操作):
            let args = Args::try_parse_from(case.clone()).unwrap();
            let result = ServerConfig::try_from(args);

            // then (期待する結果):
            assert!(result.is_err(), "args: {case:?}");
        }
    }
}
