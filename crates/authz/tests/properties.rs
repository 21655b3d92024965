//! 决策模型性质测试

use std::sync::Arc;

use fsrbac_authz::{
    ALL_ACTIONS, ALL_RESOURCE_TYPES, AuthzedAction, DecisionEngine, Permission, PermissionSet,
    Policy, Principal, Resource, ResourceType,
};
use proptest::prelude::*;

const GROUPS: [&str; 4] = ["banking-admin", "data-engineers", "data-scientists", "ds-team"];
const ROLES: [&str; 3] = ["store_admin", "reader", "writer"];
const NAMESPACES: [&str; 3] = ["feast", "feast-eap", "feast-staging"];
const NAMES: [&str; 5] = [
    "call_center_90d",
    "transaction_details",
    "customer_profile",
    "customer_transaction_interaction",
    "atm_usage_30d",
];
const PATTERNS: [&str; 3] = ["^(?!.*transaction).*", "customer_.*", "atm_.*|call_.*"];

fn subset(items: &'static [&'static str]) -> impl Strategy<Value = Vec<String>> {
    proptest::sample::subsequence(items, 0..=items.len())
        .prop_map(|v| v.into_iter().map(str::to_string).collect())
}

fn action() -> impl Strategy<Value = AuthzedAction> {
    proptest::sample::select(ALL_ACTIONS.to_vec())
}

fn resource_type() -> impl Strategy<Value = ResourceType> {
    proptest::sample::select(ALL_RESOURCE_TYPES.to_vec())
}

fn policy() -> impl Strategy<Value = Policy> {
    prop_oneof![
        Just(Policy::allow_all()),
        subset(&ROLES).prop_map(Policy::role_based),
        subset(&GROUPS).prop_map(Policy::group_based),
        subset(&NAMESPACES).prop_map(Policy::namespace_based),
        (subset(&GROUPS), subset(&NAMESPACES))
            .prop_map(|(g, n)| Policy::combined_group_namespace(g, n)),
    ]
}

fn permission(name: String) -> impl Strategy<Value = Permission> {
    (
        proptest::collection::vec(resource_type(), 1..4),
        proptest::collection::vec(action(), 1..4),
        proptest::option::of(proptest::sample::select(PATTERNS.to_vec())),
        policy(),
    )
        .prop_map(move |(types, actions, pattern, policy)| {
            let mut builder = Permission::builder(name.clone())
                .types(types)
                .actions(actions)
                .policy(policy);
            if let Some(pattern) = pattern {
                builder = builder.name_pattern(pattern);
            }
            builder.build().expect("generated permission is valid")
        })
}

fn permissions() -> impl Strategy<Value = Vec<Permission>> {
    (0usize..5).prop_flat_map(|count| {
        (0..count)
            .map(|i| permission(format!("perm_{i}")))
            .collect::<Vec<_>>()
    })
}

fn principal() -> impl Strategy<Value = Principal> {
    (subset(&ROLES), subset(&GROUPS))
        .prop_map(|(roles, groups)| Principal::new("p").with_roles(roles).with_groups(groups))
}

fn resource() -> impl Strategy<Value = Resource> {
    (
        resource_type(),
        proptest::sample::select(NAMES.to_vec()),
        proptest::sample::select(NAMESPACES.to_vec()),
    )
        .prop_map(|(kind, name, namespace)| Resource::new(kind, name, namespace))
}

fn engine(permissions: Vec<Permission>) -> DecisionEngine {
    DecisionEngine::new(Arc::new(PermissionSet::new(permissions).expect("unique names")))
}

proptest! {
    /// allow 当且仅当存在一个全部条件都满足的 Permission
    #[test]
    fn property_allow_iff_some_permission_grants(
        perms in permissions(),
        principal in principal(),
        resource in resource(),
        action in action(),
    ) {
        let expected = perms.iter().any(|p| {
            p.match_type(resource.kind)
                && p.match_name(&resource.name)
                && p.match_action(action)
                && p.policy().matches(&principal, &resource)
        });
        let decision = engine(perms).evaluate(&principal, &resource, action);
        prop_assert_eq!(decision.allowed, expected);
    }

    /// 增加 Permission 只会把 deny 变成 allow
    #[test]
    fn property_union_monotonicity(
        perms in permissions(),
        extra in permission("extra".to_string()),
        principal in principal(),
        resource in resource(),
        action in action(),
    ) {
        let before = engine(perms.clone()).evaluate(&principal, &resource, action);
        let mut extended = perms;
        extended.push(extra);
        let after = engine(extended).evaluate(&principal, &resource, action);
        prop_assert!(!before.allowed || after.allowed);
    }

    /// 组合策略不比任一组成部分更宽松
    #[test]
    fn property_combined_policy_is_conjunction(
        groups in subset(&GROUPS),
        namespaces in subset(&NAMESPACES),
        principal in principal(),
        resource in resource(),
    ) {
        let combined = Policy::combined_group_namespace(groups.clone(), namespaces.clone())
            .matches(&principal, &resource);
        let by_group = Policy::group_based(groups).matches(&principal, &resource);
        let by_namespace = Policy::namespace_based(namespaces).matches(&principal, &resource);

        prop_assert_eq!(combined, by_group && by_namespace);
    }

    /// 未被任何 Permission 覆盖的资源类型一律拒绝
    #[test]
    fn property_uncovered_kind_is_denied(
        principal in principal(),
        action in action(),
        name in proptest::sample::select(NAMES.to_vec()),
    ) {
        let covered = Permission::builder("views_only")
            .types([ResourceType::FeatureView])
            .policy(Policy::allow_all())
            .actions(ALL_ACTIONS)
            .build()
            .expect("valid permission");
        let engine = engine(vec![covered]);
        let source = Resource::new(ResourceType::DataSource, name, "feast");

        prop_assert!(!engine.evaluate(&principal, &source, action).allowed);
    }
}
