//! 权限声明文档 (TOML)
//!
//! ```toml
//! [[permissions]]
//! name = "data_scientists_permissions"
//! types = ["FeatureView", "FeatureService", "Entity"]
//! name_patterns = ["^(?!.*transaction).*"]
//! actions = ["DESCRIBE", "READ"]
//! policy = { type = "group_based", groups = ["data-scientists"] }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use figment::{
    Figment,
    providers::{Format, Toml},
};
use serde::Deserialize;
use tracing::info;

use crate::action::AuthzedAction;
use crate::error::{AuthzError, AuthzResult};
use crate::permission::Permission;
use crate::policy::Policy;
use crate::resource::{ALL_RESOURCE_TYPES, ResourceType};
use crate::store::PermissionSet;

/// `types = "ALL"` 或类型名列表
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TypesSpec {
    Keyword(String),
    List(Vec<String>),
}

impl TypesSpec {
    fn resolve(&self) -> AuthzResult<Vec<ResourceType>> {
        match self {
            Self::Keyword(word)
                if word.eq_ignore_ascii_case("ALL")
                    || word.eq_ignore_ascii_case("ALL_RESOURCE_TYPES") =>
            {
                Ok(ALL_RESOURCE_TYPES.to_vec())
            }
            Self::Keyword(word) => Ok(vec![word.parse()?]),
            Self::List(names) => names.iter().map(|n| n.parse()).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PermissionSpec {
    pub name: String,
    pub types: TypesSpec,
    #[serde(default)]
    pub name_patterns: Vec<String>,
    #[serde(default)]
    pub required_tags: BTreeMap<String, String>,
    #[serde(default)]
    pub policy: Policy,
    pub actions: Vec<String>,
}

impl TryFrom<PermissionSpec> for Permission {
    type Error = AuthzError;

    fn try_from(spec: PermissionSpec) -> Result<Self, Self::Error> {
        let types = spec.types.resolve()?;
        let mut actions = Vec::new();
        for token in &spec.actions {
            actions.extend(AuthzedAction::expand(token)?);
        }

        let mut builder = Permission::builder(spec.name)
            .types(types)
            .policy(spec.policy)
            .actions(actions);
        for pattern in spec.name_patterns {
            builder = builder.name_pattern(pattern);
        }
        for (key, value) in spec.required_tags {
            builder = builder.required_tag(key, value);
        }
        builder.build()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PermissionsDocument {
    #[serde(default)]
    pub permissions: Vec<PermissionSpec>,
}

impl PermissionsDocument {
    pub fn from_toml_str(source: &str) -> AuthzResult<Self> {
        Ok(Figment::from(Toml::string(source)).extract()?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> AuthzResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(AuthzError::DocumentNotFound(path.to_path_buf()));
        }
        Ok(Figment::from(Toml::file(path)).extract()?)
    }

    /// 校验并转换为只读权限集合
    pub fn into_permission_set(self) -> AuthzResult<PermissionSet> {
        let permissions = self
            .permissions
            .into_iter()
            .map(Permission::try_from)
            .collect::<AuthzResult<Vec<_>>>()?;
        PermissionSet::new(permissions)
    }
}

impl PermissionSet {
    pub fn from_toml_str(source: &str) -> AuthzResult<Self> {
        PermissionsDocument::from_toml_str(source)?.into_permission_set()
    }

    pub fn from_path(path: impl AsRef<Path>) -> AuthzResult<Self> {
        let path = path.as_ref();
        let set = PermissionsDocument::from_path(path)?.into_permission_set()?;
        info!(path = %path.display(), permissions = set.len(), "Permissions document loaded");
        Ok(set)
    }
}
