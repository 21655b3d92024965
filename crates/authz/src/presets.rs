//! 内置权限预设
//!
//! `banking` 对应服务端特征仓库的权限配置，`banking-namespaces` 对应
//! 客户端按 namespace 隔离的配置。

use crate::action::{ALL_ACTIONS, AuthzedAction, READ};
use crate::error::{AuthzError, AuthzResult};
use crate::permission::Permission;
use crate::policy::Policy;
use crate::resource::ResourceType;
use crate::store::PermissionSet;

pub const ADMIN_GROUP: &str = "banking-admin";
pub const DATA_ENGINEERS_GROUP: &str = "data-engineers";
pub const DATA_SCIENTISTS_GROUP: &str = "data-scientists";
pub const READ_ONLY_ANALYSTS_GROUP: &str = "read-only-analysts";
pub const RESTRICTED_USER_GROUP: &str = "restricted-user";
pub const DS_TEAM_GROUP: &str = "ds-team";

pub const PROD_NAMESPACE: &str = "feast-eap";
pub const STAGING_NAMESPACE: &str = "feast-staging";

/// 排除名称中包含 "transaction" 的对象
pub const EXCLUDE_TRANSACTION_PATTERN: &str = "^(?!.*transaction).*";

/// 数据工程师可访问的类型: 除 DataSource 外全部
const DATA_ENGINEERS_TYPES: [ResourceType; 6] = [
    ResourceType::Project,
    ResourceType::FeatureView,
    ResourceType::OnDemandFeatureView,
    ResourceType::Entity,
    ResourceType::FeatureService,
    ResourceType::SavedDataset,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Banking,
    BankingNamespaces,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Banking => "banking",
            Self::BankingNamespaces => "banking-namespaces",
        }
    }

    pub fn build(&self) -> AuthzResult<PermissionSet> {
        match self {
            Self::Banking => banking(),
            Self::BankingNamespaces => banking_namespaces(),
        }
    }
}

impl std::str::FromStr for Preset {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "banking" => Ok(Self::Banking),
            "banking-namespaces" => Ok(Self::BankingNamespaces),
            _ => Err(AuthzError::UnknownPreset(s.to_string())),
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn banking() -> AuthzResult<PermissionSet> {
    let admin = Permission::builder("admin_permissions")
        .all_types()
        .policy(Policy::group_based([ADMIN_GROUP]))
        .actions(ALL_ACTIONS)
        .build()?;

    let data_engineers = Permission::builder("data_engineers_permissions")
        .types(DATA_ENGINEERS_TYPES)
        .policy(Policy::group_based([DATA_ENGINEERS_GROUP]))
        .actions(ALL_ACTIONS)
        .build()?;

    let data_scientists = Permission::builder("data_scientists_permissions")
        .types([
            ResourceType::FeatureView,
            ResourceType::FeatureService,
            ResourceType::Entity,
        ])
        .name_pattern(EXCLUDE_TRANSACTION_PATTERN)
        .policy(Policy::group_based([DATA_SCIENTISTS_GROUP]))
        .actions([AuthzedAction::Describe])
        .actions(READ)
        .build()?;

    let read_only_analysts = Permission::builder("read_only_analysts_permissions")
        .types([
            ResourceType::FeatureView,
            ResourceType::Entity,
            ResourceType::FeatureService,
        ])
        .name_pattern(EXCLUDE_TRANSACTION_PATTERN)
        .policy(Policy::group_based([READ_ONLY_ANALYSTS_GROUP]))
        .actions([AuthzedAction::Describe, AuthzedAction::ReadOffline])
        .build()?;

    let restricted_user = Permission::builder("restricted_user_permissions")
        .types([ResourceType::FeatureView])
        .policy(Policy::group_based([RESTRICTED_USER_GROUP]))
        .actions([AuthzedAction::Describe])
        .build()?;

    PermissionSet::new(vec![
        admin,
        data_engineers,
        data_scientists,
        read_only_analysts,
        restricted_user,
    ])
}

fn banking_namespaces() -> AuthzResult<PermissionSet> {
    let admin = Permission::builder("admin_permissions")
        .all_types()
        .policy(Policy::group_based([ADMIN_GROUP]))
        .actions(ALL_ACTIONS)
        .build()?;

    let data_team = Permission::builder("data_team_permissions")
        .all_types()
        .policy(Policy::combined_group_namespace(
            [DATA_ENGINEERS_GROUP],
            [PROD_NAMESPACE],
        ))
        .actions(ALL_ACTIONS)
        .build()?;

    let ds_team = Permission::builder("ds_team_permissions")
        .all_types()
        .policy(Policy::combined_group_namespace(
            [DS_TEAM_GROUP],
            [STAGING_NAMESPACE],
        ))
        .actions([AuthzedAction::Describe])
        .actions(READ)
        .build()?;

    PermissionSet::new(vec![admin, data_team, ds_team])
}
