//! Nick map loader.
//!
//! The file is a JSON object mapping nick to password, read once at startup.

use std::{collections::HashMap, path::Path};

use crate::{config::ConfigError, domain::NickMap};

/// Load the nick map from `path`; no path means an empty map.
pub fn load_nick_map(path: Option<&Path>) -> Result<NickMap, ConfigError> {
    let Some(path) = path else {
        return Ok(NickMap::default());
    };
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let entries: HashMap<String, String> =
        serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::info!("Loaded {} reserved nicks from {}", entries.len(), path.display());
    Ok(NickMap::new(entries))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("parlor-{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_nick_map() {
        // テスト項目: JSON ファイルからニックネームとパスワードを読み込む
        // given (前提条件):
        let path = write_temp("nicks.json", r#"{"root": "hunter2", "admin": "s3cret"}"#);

        // when (操作):
        let nick_map = load_nick_map(Some(&path)).unwrap();

        // then (期待する結果):
        assert_eq!(nick_map.len(), 2);
        assert_eq!(nick_map.password_for("root"), Some("hunter2"));
        assert_eq!(nick_map.password_for("alice"), None);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_no_path_is_empty() {
        // given (前提条件) / when (操作):
        let nick_map = load_nick_map(None).unwrap();

        // then (期待する結果):
        assert!(nick_map.is_empty());
    }

    #[test]
    fn test_malformed_file_is_error() {
        // given (前提条件):
        let path = write_temp("broken.json", r#"["not", "an", "object"]"#);

        // when (操作):
        let result = load_nick_map(Some(&path));

        // then (期待する結果):
        assert!(matches!(result, Err(ConfigError::Json { .. })));
        std::fs::remove_file(path).unwrap();
    }
}
