//! 授权策略
//!
//! 每个变体都是一个纯谓词。空集合合法，但永远不会匹配。

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::principal::Principal;
use crate::resource::Resource;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum Policy {
    /// 任意调用方
    #[default]
    AllowAll,
    /// 调用方角色与 `roles` 有交集
    RoleBased {
        #[serde(default)]
        roles: BTreeSet<String>,
    },
    /// 调用方用户组与 `groups` 有交集
    GroupBased {
        #[serde(default)]
        groups: BTreeSet<String>,
    },
    /// 资源 namespace 属于 `namespaces`
    NamespaceBased {
        #[serde(default)]
        namespaces: BTreeSet<String>,
    },
    /// 用户组与 namespace 同时匹配
    CombinedGroupNamespace {
        #[serde(default)]
        groups: BTreeSet<String>,
        #[serde(default)]
        namespaces: BTreeSet<String>,
    },
}

fn to_set<I, S>(items: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

impl Policy {
    pub fn allow_all() -> Self {
        Self::AllowAll
    }

    pub fn role_based<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::RoleBased { roles: to_set(roles) }
    }

    pub fn group_based<I, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::GroupBased { groups: to_set(groups) }
    }

    pub fn namespace_based<I, S>(namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::NamespaceBased {
            namespaces: to_set(namespaces),
        }
    }

    pub fn combined_group_namespace<G, N, S, T>(groups: G, namespaces: N) -> Self
    where
        G: IntoIterator<Item = S>,
        N: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self::CombinedGroupNamespace {
            groups: to_set(groups),
            namespaces: to_set(namespaces),
        }
    }

    /// 评估策略
    ///
    /// 角色与用户组只看调用方；namespace 取自被访问的资源。
    pub fn matches(&self, principal: &Principal, resource: &Resource) -> bool {
        match self {
            Self::AllowAll => true,
            Self::RoleBased { roles } => principal.has_any_role(roles),
            Self::GroupBased { groups } => principal.in_any_group(groups),
            Self::NamespaceBased { namespaces } => namespaces.contains(&resource.namespace),
            Self::CombinedGroupNamespace { groups, namespaces } => {
                principal.in_any_group(groups) && namespaces.contains(&resource.namespace)
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::AllowAll => "AllowAllPolicy",
            Self::RoleBased { .. } => "RoleBasedPolicy",
            Self::GroupBased { .. } => "GroupBasedPolicy",
            Self::NamespaceBased { .. } => "NamespaceBasedPolicy",
            Self::CombinedGroupNamespace { .. } => "CombinedGroupNamespacePolicy",
        }
    }
}

fn join(set: &BTreeSet<String>) -> String {
    set.iter().map(String::as_str).collect::<Vec<_>>().join(",")
}

impl std::fmt::Display for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AllowAll => write!(f, "{}", self.kind()),
            Self::RoleBased { roles } => write!(f, "{}(roles=[{}])", self.kind(), join(roles)),
            Self::GroupBased { groups } => write!(f, "{}(groups=[{}])", self.kind(), join(groups)),
            Self::NamespaceBased { namespaces } => {
                write!(f, "{}(namespaces=[{}])", self.kind(), join(namespaces))
            }
            Self::CombinedGroupNamespace { groups, namespaces } => write!(
                f,
                "{}(groups=[{}], namespaces=[{}])",
                self.kind(),
                join(groups),
                join(namespaces)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceType;

    fn feature_view(namespace: &str) -> Resource {
        Resource::new(ResourceType::FeatureView, "call_center_90d", namespace)
    }

    #[test]
    fn test_role_based() {
        let policy = Policy::role_based(["store_admin"]);
        let admin = Principal::new("alice").with_roles(["store_admin", "reader"]);
        let reader = Principal::new("bob").with_roles(["reader"]);

        assert!(policy.matches(&admin, &feature_view("feast")));
        assert!(!policy.matches(&reader, &feature_view("feast")));
    }

    #[test]
    fn test_group_based() {
        let policy = Policy::group_based(["data-engineers"]);
        let engineer = Principal::new("dave").with_groups(["data-engineers"]);
        let scientist = Principal::new("sam").with_groups(["data-scientists"]);

        assert!(policy.matches(&engineer, &feature_view("feast")));
        assert!(!policy.matches(&scientist, &feature_view("feast")));
    }

    #[test]
    fn test_namespace_based_uses_resource_namespace() {
        let policy = Policy::namespace_based(["feast-staging"]);
        let anyone = Principal::new("eve");

        assert!(policy.matches(&anyone, &feature_view("feast-staging")));
        assert!(!policy.matches(&anyone, &feature_view("feast-eap")));
    }

    #[test]
    fn test_combined_requires_both() {
        let policy = Policy::combined_group_namespace(["ds-team"], ["feast-staging"]);
        let member = Principal::new("sam").with_groups(["ds-team"]);
        let outsider = Principal::new("olga").with_groups(["marketing"]);

        assert!(policy.matches(&member, &feature_view("feast-staging")));
        assert!(!policy.matches(&member, &feature_view("feast-eap")));
        assert!(!policy.matches(&outsider, &feature_view("feast-staging")));
    }

    #[test]
    fn test_empty_sets_never_match() {
        let principal = Principal::new("alice")
            .with_roles(["admin"])
            .with_groups(["banking-admin"]);
        let resource = feature_view("feast");

        assert!(!Policy::role_based(Vec::<String>::new()).matches(&principal, &resource));
        assert!(!Policy::group_based(Vec::<String>::new()).matches(&principal, &resource));
        assert!(!Policy::namespace_based(Vec::<String>::new()).matches(&principal, &resource));
        assert!(Policy::allow_all().matches(&principal, &resource));
    }

    #[test]
    fn test_serde_tagging() {
        let policy: Policy = serde_json::from_str(
            r#"{"type":"combined_group_namespace","groups":["ds-team"],"namespaces":["feast-staging"]}"#,
        )
        .unwrap();
        assert_eq!(
            policy,
            Policy::combined_group_namespace(["ds-team"], ["feast-staging"])
        );
        assert_eq!(
            policy.to_string(),
            "CombinedGroupNamespacePolicy(groups=[ds-team], namespaces=[feast-staging])"
        );
    }
}
