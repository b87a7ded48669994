//! Nickname validation.
//!
//! [`verify_nick`] is a pure decision function. Callers must evaluate it and
//! apply the result inside one critical section, see
//! [`ChatState::rename`](super::state::ChatState::rename).

use std::collections::HashMap;

use super::{
    entity::{COW_SENDER, SYSTEM_SENDER},
    value_object::Nickname,
};

/// Immutable table of reserved nicknames and their passwords.
///
/// A nickname without an entry needs no password.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NickMap(HashMap<String, String>);

impl NickMap {
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self(entries)
    }

    pub fn password_for(&self, nick: &str) -> Option<&str> {
        self.0.get(nick).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A rename request in `nick[:password]` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NickRequest<'a> {
    pub name: &'a str,
    pub password: Option<&'a str>,
}

impl<'a> NickRequest<'a> {
    pub fn parse(text: &'a str) -> Self {
        match text.split_once(':') {
            Some((name, password)) => Self {
                name,
                password: Some(password),
            },
            None => Self {
                name: text,
                password: None,
            },
        }
    }
}

/// Outcome of a nickname verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NickVerdict {
    Ok(Nickname),
    Used,
    Invalid,
}

/// Decide whether `request` may be claimed.
///
/// Policy, in order: a name held by a connected user is `Used`; a wrong
/// password for a reserved name, a reserved sender id or a name that is not
/// a valid [`Nickname`] is `Invalid`; anything else is `Ok`.
pub fn verify_nick<'n>(
    request: &NickRequest<'_>,
    taken: impl IntoIterator<Item = &'n Nickname>,
    nick_map: &NickMap,
) -> NickVerdict {
    if taken.into_iter().any(|nick| nick.as_str() == request.name) {
        return NickVerdict::Used;
    }

    if let Some(expected) = nick_map.password_for(request.name)
        && request.password.unwrap_or_default() != expected
    {
        return NickVerdict::Invalid;
    }

    if request.name == SYSTEM_SENDER || request.name == COW_SENDER {
        return NickVerdict::Invalid;
    }

    match Nickname::new(request.name.to_string()) {
        Ok(nick) => NickVerdict::Ok(nick),
        Err(_) => NickVerdict::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nick(value: &str) -> Nickname {
        Nickname::new(value.to_string()).unwrap()
    }

    fn nick_map() -> NickMap {
        NickMap::new(HashMap::from([("admin".to_string(), "hunter2".to_string())]))
    }

    #[test]
    fn test_parse_splits_password() {
        // given (前提条件) / when (操作):
        let with_password = NickRequest::parse("admin:hunter2");
        let without_password = NickRequest::parse("alice");
        let empty_password = NickRequest::parse("bob:");

        // then (期待する結果):
        assert_eq!(with_password.name, "admin");
        assert_eq!(with_password.password, Some("hunter2"));
        assert_eq!(without_password.password, None);
        assert_eq!(empty_password.password, Some(""));
    }

    #[test]
    fn test_free_nick_is_ok() {
        // テスト項目: 未使用かつ予約されていないニックネームは Ok
        // given (前提条件):
        let taken = [nick("bob")];

        // when (操作):
        let verdict = verify_nick(&NickRequest::parse("alice"), &taken, &nick_map());

        // then (期待する結果):
        assert_eq!(verdict, NickVerdict::Ok(nick("alice")));
    }

    #[test]
    fn test_long_alphanumeric_nick_is_ok() {
        // テスト項目: 33 文字以上でも英数字のみで未使用なら Ok
        // given (前提条件):
        let requested = "a".repeat(33);
        let taken: [Nickname; 0] = [];

        // when (操作):
        let verdict = verify_nick(&NickRequest::parse(&requested), &taken, &NickMap::default());

        // then (期待する結果):
        assert_eq!(verdict, NickVerdict::Ok(nick(&requested)));
    }

    #[test]
    fn test_taken_nick_is_used() {
        // テスト項目: 接続中ユーザーが使用中のニックネームは Used
        // given (前提条件):
        let taken = [nick("alice"), nick("bob")];

        // when (操作):
        let verdict = verify_nick(&NickRequest::parse("alice"), &taken, &nick_map());

        // then (期待する結果):
        assert_eq!(verdict, NickVerdict::Used);
    }

    #[test]
    fn test_used_takes_precedence_over_invalid_password() {
        // given (前提条件):
        let taken = [nick("admin")];

        // when (操作):
        let verdict = verify_nick(&NickRequest::parse("admin:wrong"), &taken, &nick_map());

        // then (期待する結果):
        assert_eq!(verdict, NickVerdict::Used);
    }

    #[test]
    fn test_reserved_nick_requires_matching_password() {
        // テスト項目: 予約ニックネームはパスワード一致時のみ Ok
        // given (前提条件):
        let taken: [Nickname; 0] = [];
        let map = nick_map();

        // when (操作):
        let wrong = verify_nick(&NickRequest::parse("admin:guess"), &taken, &map);
        let missing = verify_nick(&NickRequest::parse("admin"), &taken, &map);
        let right = verify_nick(&NickRequest::parse("admin:hunter2"), &taken, &map);

        // then (期待する結果):
        assert_eq!(wrong, NickVerdict::Invalid);
        assert_eq!(missing, NickVerdict::Invalid);
        assert_eq!(right, NickVerdict::Ok(nick("admin")));
    }

    #[test]
    fn test_non_alphanumeric_empty_and_reserved_ids_are_invalid() {
        // given (前提条件):
        let taken: [Nickname; 0] = [];

        for request in ["al ice", "", "bob!", "system", "cow"] {
            // when (操作):
            let verdict = verify_nick(&NickRequest::parse(request), &taken, &NickMap::default());

            // then (期待する結果):
            assert_eq!(verdict, NickVerdict::Invalid, "request: {request:?}");
        }
    }
}
