//! 决策引擎
//!
//! 纯函数式评估，无共享可变状态，可并发调用。

use std::sync::Arc;
use std::time::Instant;

use fsrbac_telemetry::{DECISION_DURATION_US, DECISIONS_TOTAL};
use metrics::{counter, histogram};
use serde::Serialize;
use tracing::{debug, warn};

use crate::action::{AuthzedAction, join_actions};
use crate::error::{AuthzError, AuthzResult};
use crate::permission::Permission;
use crate::principal::Principal;
use crate::resource::Resource;
use crate::store::PermissionSet;

/// 授权请求
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub principal: Principal,
    pub resource: Resource,
    pub actions: Vec<AuthzedAction>,
}

impl AuthorizationRequest {
    pub fn new(principal: Principal, resource: Resource, action: AuthzedAction) -> Self {
        Self {
            principal,
            resource,
            actions: vec![action],
        }
    }

    pub fn with_actions(mut self, actions: impl IntoIterator<Item = AuthzedAction>) -> Self {
        self.actions = actions.into_iter().collect();
        self
    }
}

/// 决策原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionReason {
    /// 存在匹配的 Permission 且其 policy 匹配
    Granted,
    /// 没有 Permission 覆盖该资源与操作 (默认拒绝)
    NoApplicablePermission,
    /// 有适用的 Permission，但调用方不满足任何 policy
    PolicyMismatch,
}

impl DecisionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Granted => "GRANTED",
            Self::NoApplicablePermission => "NO_APPLICABLE_PERMISSION",
            Self::PolicyMismatch => "POLICY_MISMATCH",
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Self::Granted => "granted",
            Self::NoApplicablePermission => "no permission covers the resource and actions",
            Self::PolicyMismatch => "no applicable permission policy matches the principal",
        }
    }
}

impl std::fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 决策结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub allowed: bool,
    pub reason: DecisionReason,
    /// 授予访问的 Permission 名称
    pub matched_permission: Option<String>,
}

impl Decision {
    pub fn allow(permission: impl Into<String>) -> Self {
        Self {
            allowed: true,
            reason: DecisionReason::Granted,
            matched_permission: Some(permission.into()),
        }
    }

    pub fn deny(reason: DecisionReason) -> Self {
        Self {
            allowed: false,
            reason,
            matched_permission: None,
        }
    }
}

/// 单个 Permission 的评估轨迹
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TraceOutcome {
    TypeMismatch,
    NameMismatch,
    TagMismatch,
    ActionMismatch,
    PolicyMismatch,
    Granted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionTrace {
    pub permission: String,
    pub outcome: TraceOutcome,
}

/// 决策引擎
///
/// 并集语义: 只要任一适用 Permission 的 policy 匹配即允许，
/// 没有 deny 规则，未覆盖的资源默认拒绝。
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    permissions: Arc<PermissionSet>,
}

impl DecisionEngine {
    pub fn new(permissions: Arc<PermissionSet>) -> Self {
        Self { permissions }
    }

    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    pub fn evaluate(
        &self,
        principal: &Principal,
        resource: &Resource,
        action: AuthzedAction,
    ) -> Decision {
        self.evaluate_all(principal, resource, &[action])
    }

    /// 多操作评估：单个 Permission 须同时覆盖全部操作
    pub fn evaluate_all(
        &self,
        principal: &Principal,
        resource: &Resource,
        actions: &[AuthzedAction],
    ) -> Decision {
        let start = Instant::now();

        let decision = self.decide(principal, resource, actions);

        counter!(
            DECISIONS_TOTAL,
            "allowed" => decision.allowed.to_string(),
            "reason" => decision.reason.as_str()
        )
        .increment(1);
        histogram!(DECISION_DURATION_US).record(start.elapsed().as_micros() as f64);

        debug!(
            principal = %principal,
            resource = %resource,
            namespace = %resource.namespace,
            actions = %join_actions(actions),
            allowed = decision.allowed,
            reason = %decision.reason,
            matched_permission = decision.matched_permission.as_deref().unwrap_or("-"),
            "Authorization decision"
        );

        decision
    }

    fn decide(
        &self,
        principal: &Principal,
        resource: &Resource,
        actions: &[AuthzedAction],
    ) -> Decision {
        let mut applicable = false;
        for permission in self.permissions.applicable(resource, actions) {
            applicable = true;
            if permission.policy().matches(principal, resource) {
                return Decision::allow(permission.name());
            }
        }

        if applicable {
            Decision::deny(DecisionReason::PolicyMismatch)
        } else {
            Decision::deny(DecisionReason::NoApplicablePermission)
        }
    }

    pub fn evaluate_request(&self, request: &AuthorizationRequest) -> Decision {
        self.evaluate_all(&request.principal, &request.resource, &request.actions)
    }

    /// 批量评估
    pub fn batch_evaluate(&self, requests: &[AuthorizationRequest]) -> Vec<Decision> {
        requests.iter().map(|r| self.evaluate_request(r)).collect()
    }

    /// 断言授权，拒绝时返回 `PermissionDenied`
    pub fn check(
        &self,
        principal: &Principal,
        resource: &Resource,
        action: AuthzedAction,
    ) -> AuthzResult<()> {
        self.check_all(principal, resource, &[action])
    }

    pub fn check_all(
        &self,
        principal: &Principal,
        resource: &Resource,
        actions: &[AuthzedAction],
    ) -> AuthzResult<()> {
        let decision = self.evaluate_all(principal, resource, actions);
        if decision.allowed {
            return Ok(());
        }

        warn!(
            principal = %principal,
            resource = %resource,
            actions = %join_actions(actions),
            reason = %decision.reason,
            "Permission denied"
        );
        Err(AuthzError::PermissionDenied {
            principal: principal.name.clone(),
            resource: resource.to_string(),
            actions: join_actions(actions),
            reason: decision.reason.describe().to_string(),
        })
    }

    /// 仅过滤模式：返回调用方有权访问的资源，不报错
    pub fn filter_resources<'a, I>(
        &self,
        principal: &Principal,
        resources: I,
        actions: &[AuthzedAction],
    ) -> Vec<&'a Resource>
    where
        I: IntoIterator<Item = &'a Resource>,
    {
        resources
            .into_iter()
            .filter(|r| self.evaluate_all(principal, r, actions).allowed)
            .collect()
    }

    /// 逐个 Permission 给出首个不满足的条件，用于诊断
    pub fn explain(
        &self,
        principal: &Principal,
        resource: &Resource,
        action: AuthzedAction,
    ) -> Vec<PermissionTrace> {
        self.permissions
            .iter()
            .map(|permission| PermissionTrace {
                permission: permission.name().to_string(),
                outcome: trace(permission, principal, resource, action),
            })
            .collect()
    }
}

fn trace(
    permission: &Permission,
    principal: &Principal,
    resource: &Resource,
    action: AuthzedAction,
) -> TraceOutcome {
    if !permission.match_type(resource.kind) {
        TraceOutcome::TypeMismatch
    } else if !permission.match_name(&resource.name) {
        TraceOutcome::NameMismatch
    } else if !permission.match_tags(&resource.tags) {
        TraceOutcome::TagMismatch
    } else if !permission.match_action(action) {
        TraceOutcome::ActionMismatch
    } else if !permission.policy().matches(principal, resource) {
        TraceOutcome::PolicyMismatch
    } else {
        TraceOutcome::Granted
    }
}
