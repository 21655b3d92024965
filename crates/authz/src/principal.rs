//! 调用方身份

use std::collections::BTreeSet;

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// 已认证的调用方，携带角色与用户组
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[display("{name}")]
pub struct Principal {
    pub name: String,
    #[serde(default)]
    pub roles: BTreeSet<String>,
    #[serde(default)]
    pub groups: BTreeSet<String>,
}

impl Principal {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups.extend(groups.into_iter().map(Into::into));
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn in_group(&self, group: &str) -> bool {
        self.groups.contains(group)
    }

    pub fn has_any_role(&self, roles: &BTreeSet<String>) -> bool {
        !self.roles.is_disjoint(roles)
    }

    pub fn in_any_group(&self, groups: &BTreeSet<String>) -> bool {
        !self.groups.is_disjoint(groups)
    }
}
