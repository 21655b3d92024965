//! 权限集合 (policy store)
//!
//! 启动时构建一次，之后只读共享。

use std::collections::HashMap;

use crate::action::AuthzedAction;
use crate::error::{AuthzError, AuthzResult};
use crate::permission::Permission;
use crate::resource::Resource;

#[derive(Debug, Clone, Default)]
pub struct PermissionSet {
    permissions: Vec<Permission>,
    index: HashMap<String, usize>,
}

impl PermissionSet {
    /// 构建权限集合，名称必须唯一
    pub fn new(permissions: Vec<Permission>) -> AuthzResult<Self> {
        let mut index = HashMap::with_capacity(permissions.len());
        for (position, permission) in permissions.iter().enumerate() {
            if index.insert(permission.name().to_string(), position).is_some() {
                return Err(AuthzError::DuplicatePermission(permission.name().to_string()));
            }
        }
        Ok(Self { permissions, index })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// 追加一个 Permission，返回新的集合
    pub fn with_permission(&self, permission: Permission) -> AuthzResult<Self> {
        let mut permissions = self.permissions.clone();
        permissions.push(permission);
        Self::new(permissions)
    }

    pub fn get(&self, name: &str) -> Option<&Permission> {
        self.index.get(name).map(|&i| &self.permissions[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.permissions.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.permissions.iter().map(Permission::name)
    }

    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    /// 适用于该资源、且覆盖全部请求操作的权限
    pub fn applicable<'a>(
        &'a self,
        resource: &'a Resource,
        actions: &'a [AuthzedAction],
    ) -> impl Iterator<Item = &'a Permission> + 'a {
        self.permissions
            .iter()
            .filter(move |p| p.match_resource(resource) && p.match_actions(actions))
    }
}

impl<'a> IntoIterator for &'a PermissionSet {
    type Item = &'a Permission;
    type IntoIter = std::slice::Iter<'a, Permission>;

    fn into_iter(self) -> Self::IntoIter {
        self.permissions.iter()
    }
}
