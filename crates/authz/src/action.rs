//! 受授权控制的操作

use serde::{Deserialize, Serialize};

use crate::error::{AuthzError, AuthzResult};

/// 需要授权的操作类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthzedAction {
    Create,
    Describe,
    Update,
    Delete,
    ReadOnline,
    ReadOffline,
    WriteOnline,
    WriteOffline,
}

/// 全部操作
pub const ALL_ACTIONS: [AuthzedAction; 8] = [
    AuthzedAction::Create,
    AuthzedAction::Describe,
    AuthzedAction::Update,
    AuthzedAction::Delete,
    AuthzedAction::ReadOnline,
    AuthzedAction::ReadOffline,
    AuthzedAction::WriteOnline,
    AuthzedAction::WriteOffline,
];

/// 在线 + 离线读取
pub const READ: [AuthzedAction; 2] = [AuthzedAction::ReadOffline, AuthzedAction::ReadOnline];

/// 在线 + 离线写入
pub const WRITE: [AuthzedAction; 2] = [AuthzedAction::WriteOffline, AuthzedAction::WriteOnline];

/// 注册表对象的增删改查
pub const CRUD: [AuthzedAction; 4] = [
    AuthzedAction::Create,
    AuthzedAction::Describe,
    AuthzedAction::Update,
    AuthzedAction::Delete,
];

impl AuthzedAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Describe => "DESCRIBE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::ReadOnline => "READ_ONLINE",
            Self::ReadOffline => "READ_OFFLINE",
            Self::WriteOnline => "WRITE_ONLINE",
            Self::WriteOffline => "WRITE_OFFLINE",
        }
    }

    /// 展开单个操作名或操作组名 (ALL / READ / WRITE / CRUD)
    pub fn expand(token: &str) -> AuthzResult<Vec<AuthzedAction>> {
        match token.trim().to_uppercase().as_str() {
            "ALL" | "ALL_ACTIONS" => Ok(ALL_ACTIONS.to_vec()),
            "READ" => Ok(READ.to_vec()),
            "WRITE" => Ok(WRITE.to_vec()),
            "CRUD" => Ok(CRUD.to_vec()),
            _ => token.parse().map(|action| vec![action]),
        }
    }
}

impl std::fmt::Display for AuthzedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AuthzedAction {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace('-', "_");
        ALL_ACTIONS
            .iter()
            .copied()
            .find(|action| action.as_str() == normalized)
            .ok_or_else(|| AuthzError::UnknownAction(s.to_string()))
    }
}

/// 以 `A,B,C` 形式输出操作列表
pub(crate) fn join_actions(actions: &[AuthzedAction]) -> String {
    actions
        .iter()
        .map(AuthzedAction::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("read_offline".parse::<AuthzedAction>().unwrap(), AuthzedAction::ReadOffline);
        assert_eq!("Write-Online".parse::<AuthzedAction>().unwrap(), AuthzedAction::WriteOnline);
        assert!("READ_EVERYTHING".parse::<AuthzedAction>().is_err());
    }

    #[test]
    fn test_expand_groups() {
        assert_eq!(AuthzedAction::expand("ALL").unwrap().len(), 8);
        assert_eq!(
            AuthzedAction::expand("read").unwrap(),
            vec![AuthzedAction::ReadOffline, AuthzedAction::ReadOnline]
        );
        assert_eq!(AuthzedAction::expand("DESCRIBE").unwrap(), vec![AuthzedAction::Describe]);
        assert!(matches!(
            AuthzedAction::expand("PURGE"),
            Err(AuthzError::UnknownAction(_))
        ));
    }

    #[test]
    fn test_serde_uses_upper_snake_case() {
        let json = serde_json::to_string(&AuthzedAction::ReadOnline).unwrap();
        assert_eq!(json, "\"READ_ONLINE\"");
    }
}
