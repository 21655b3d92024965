//! 权限声明
//!
//! 一个 Permission 把资源类型、操作集合和一个 Policy 绑定在一起，
//! 构造后不可变。

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::action::AuthzedAction;
use crate::error::{AuthzError, AuthzResult};
use crate::pattern::NamePattern;
use crate::policy::Policy;
use crate::resource::{ALL_RESOURCE_TYPES, Resource, ResourceType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Permission {
    name: String,
    types: BTreeSet<ResourceType>,
    name_patterns: Vec<NamePattern>,
    required_tags: BTreeMap<String, String>,
    policy: Policy,
    actions: BTreeSet<AuthzedAction>,
}

impl Permission {
    pub fn builder(name: impl Into<String>) -> PermissionBuilder {
        PermissionBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn types(&self) -> &BTreeSet<ResourceType> {
        &self.types
    }

    pub fn name_patterns(&self) -> &[NamePattern] {
        &self.name_patterns
    }

    pub fn required_tags(&self) -> &BTreeMap<String, String> {
        &self.required_tags
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn actions(&self) -> &BTreeSet<AuthzedAction> {
        &self.actions
    }

    /// 资源类型是否被覆盖 (含子类型)
    pub fn match_type(&self, kind: ResourceType) -> bool {
        self.types.iter().any(|t| kind.is_kind_of(*t))
    }

    /// 未声明名称模式时匹配所有名称，否则任一模式整串匹配即可
    pub fn match_name(&self, name: &str) -> bool {
        self.name_patterns.is_empty() || self.name_patterns.iter().any(|p| p.is_match(name))
    }

    /// 资源须携带全部 required_tags 且值相等
    pub fn match_tags(&self, tags: &BTreeMap<String, String>) -> bool {
        self.required_tags
            .iter()
            .all(|(key, value)| tags.get(key) == Some(value))
    }

    pub fn match_resource(&self, resource: &Resource) -> bool {
        self.match_type(resource.kind)
            && self.match_name(&resource.name)
            && self.match_tags(&resource.tags)
    }

    pub fn match_action(&self, action: AuthzedAction) -> bool {
        self.actions.contains(&action)
    }

    /// 必须覆盖所有请求的操作；空请求不匹配
    pub fn match_actions(&self, actions: &[AuthzedAction]) -> bool {
        !actions.is_empty() && actions.iter().all(|a| self.match_action(*a))
    }
}

/// Permission 构建器
#[derive(Debug, Clone)]
pub struct PermissionBuilder {
    name: String,
    types: BTreeSet<ResourceType>,
    name_patterns: Vec<String>,
    required_tags: BTreeMap<String, String>,
    policy: Policy,
    actions: BTreeSet<AuthzedAction>,
}

impl PermissionBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: BTreeSet::new(),
            name_patterns: Vec::new(),
            required_tags: BTreeMap::new(),
            policy: Policy::default(),
            actions: BTreeSet::new(),
        }
    }

    pub fn types(mut self, types: impl IntoIterator<Item = ResourceType>) -> Self {
        self.types.extend(types);
        self
    }

    pub fn all_types(self) -> Self {
        self.types(ALL_RESOURCE_TYPES)
    }

    pub fn name_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.name_patterns.push(pattern.into());
        self
    }

    pub fn required_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.required_tags.insert(key.into(), value.into());
        self
    }

    pub fn policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    pub fn actions(mut self, actions: impl IntoIterator<Item = AuthzedAction>) -> Self {
        self.actions.extend(actions);
        self
    }

    pub fn build(self) -> AuthzResult<Permission> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(AuthzError::invalid_permission(
                self.name,
                "name must not be empty",
            ));
        }
        if self.types.is_empty() {
            return Err(AuthzError::invalid_permission(
                name,
                "at least one resource type is required",
            ));
        }
        if self.actions.is_empty() {
            return Err(AuthzError::invalid_permission(
                name,
                "at least one action is required",
            ));
        }

        let name_patterns = self
            .name_patterns
            .into_iter()
            .map(NamePattern::new)
            .collect::<AuthzResult<Vec<_>>>()?;

        Ok(Permission {
            name,
            types: self.types,
            name_patterns,
            required_tags: self.required_tags,
            policy: self.policy,
            actions: self.actions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::READ;

    fn data_scientists() -> Permission {
        Permission::builder("data_scientists_permissions")
            .types([
                ResourceType::FeatureView,
                ResourceType::FeatureService,
                ResourceType::Entity,
            ])
            .name_pattern("^(?!.*transaction).*")
            .policy(Policy::group_based(["data-scientists"]))
            .actions([AuthzedAction::Describe])
            .actions(READ)
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_permission() {
        let perm = data_scientists();

        assert_eq!(perm.name(), "data_scientists_permissions");
        assert_eq!(perm.types().len(), 3);
        assert_eq!(perm.actions().len(), 3);
        assert_eq!(perm.name_patterns()[0].as_str(), "^(?!.*transaction).*");
    }

    #[test]
    fn test_empty_actions_rejected() {
        let err = Permission::builder("nothing")
            .all_types()
            .build()
            .unwrap_err();
        assert!(matches!(err, AuthzError::InvalidPermission { .. }));
    }

    #[test]
    fn test_empty_types_rejected() {
        let err = Permission::builder("nowhere")
            .actions([AuthzedAction::Describe])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("resource type"));
    }

    #[test]
    fn test_blank_name_rejected() {
        let err = Permission::builder("   ")
            .all_types()
            .actions([AuthzedAction::Describe])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("name must not be empty"));
    }

    #[test]
    fn test_match_resource() {
        let perm = data_scientists();

        let profile = Resource::new(ResourceType::FeatureView, "customer_profile", "feast");
        let transactions = Resource::new(ResourceType::FeatureView, "transaction_summary", "feast");
        let source = Resource::new(ResourceType::DataSource, "customer_data_source", "feast");

        assert!(perm.match_resource(&profile));
        assert!(!perm.match_resource(&transactions));
        assert!(!perm.match_resource(&source));
    }

    #[test]
    fn test_feature_view_covers_subkinds() {
        let perm = data_scientists();
        let batch = Resource::new(ResourceType::BatchFeatureView, "atm_usage_30d", "feast");
        let on_demand = Resource::new(
            ResourceType::OnDemandFeatureView,
            "calculate_simple_risk_score",
            "feast",
        );

        assert!(perm.match_resource(&batch));
        assert!(!perm.match_resource(&on_demand));
    }

    #[test]
    fn test_required_tags() {
        let perm = Permission::builder("pii_readers")
            .types([ResourceType::DataSource])
            .required_tag("pii", "true")
            .actions([AuthzedAction::ReadOffline])
            .build()
            .unwrap();

        let pii = Resource::new(ResourceType::DataSource, "customer_data_source", "feast")
            .with_tag("pii", "true")
            .with_tag("domain", "customer");
        let not_pii = Resource::new(ResourceType::DataSource, "atm_usage_data_source", "feast")
            .with_tag("pii", "false");
        let untagged = Resource::new(ResourceType::DataSource, "branch_details_data_source", "feast");

        assert!(perm.match_resource(&pii));
        assert!(!perm.match_resource(&not_pii));
        assert!(!perm.match_resource(&untagged));
    }

    #[test]
    fn test_match_actions_requires_all() {
        let perm = data_scientists();

        assert!(perm.match_actions(&[AuthzedAction::ReadOffline]));
        assert!(perm.match_actions(&READ));
        assert!(!perm.match_actions(&[AuthzedAction::ReadOnline, AuthzedAction::WriteOnline]));
        assert!(!perm.match_actions(&[]));
    }
}
