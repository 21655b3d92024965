//! fsrbac-authz - 特征仓库权限评估
//!
//! 声明式 Permission 集合 + 无状态决策引擎。
//!
//! 决策模型: 对 (principal, resource, action) 收集所有适用的 Permission
//! (资源类型、名称模式、标签、操作均匹配)，只要其中任意一个的 policy 匹配即允许；
//! 没有显式的 deny 规则，未覆盖的资源类型默认拒绝。

pub mod action;
pub mod document;
pub mod engine;
pub mod error;
pub mod operations;
pub mod pattern;
pub mod permission;
pub mod policy;
pub mod presets;
pub mod principal;
pub mod resource;
pub mod store;

pub use action::{ALL_ACTIONS, AuthzedAction, CRUD, READ, WRITE};
pub use document::{PermissionSpec, PermissionsDocument};
pub use engine::{
    AuthorizationRequest, Decision, DecisionEngine, DecisionReason, PermissionTrace, TraceOutcome,
};
pub use error::{AuthzError, AuthzResult};
pub use operations::ClientOperation;
pub use pattern::NamePattern;
pub use permission::{Permission, PermissionBuilder};
pub use policy::Policy;
pub use presets::Preset;
pub use principal::Principal;
pub use resource::{ALL_RESOURCE_TYPES, Resource, ResourceType};
pub use store::PermissionSet;
