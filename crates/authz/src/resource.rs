//! 受保护的资源

use std::collections::BTreeMap;

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::error::AuthzError;

/// 资源类型标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    Project,
    Entity,
    FeatureView,
    OnDemandFeatureView,
    BatchFeatureView,
    StreamFeatureView,
    FeatureService,
    DataSource,
    ValidationReference,
    SavedDataset,
    Permission,
}

/// 全部资源类型
pub const ALL_RESOURCE_TYPES: [ResourceType; 11] = [
    ResourceType::Project,
    ResourceType::Entity,
    ResourceType::FeatureView,
    ResourceType::OnDemandFeatureView,
    ResourceType::BatchFeatureView,
    ResourceType::StreamFeatureView,
    ResourceType::FeatureService,
    ResourceType::DataSource,
    ResourceType::ValidationReference,
    ResourceType::SavedDataset,
    ResourceType::Permission,
];

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Project => "Project",
            Self::Entity => "Entity",
            Self::FeatureView => "FeatureView",
            Self::OnDemandFeatureView => "OnDemandFeatureView",
            Self::BatchFeatureView => "BatchFeatureView",
            Self::StreamFeatureView => "StreamFeatureView",
            Self::FeatureService => "FeatureService",
            Self::DataSource => "DataSource",
            Self::ValidationReference => "ValidationReference",
            Self::SavedDataset => "SavedDataset",
            Self::Permission => "Permission",
        }
    }

    /// 父类型。Batch/Stream feature view 同时也是 FeatureView
    pub fn parent(&self) -> Option<ResourceType> {
        match self {
            Self::BatchFeatureView | Self::StreamFeatureView => Some(Self::FeatureView),
            _ => None,
        }
    }

    /// `self` 是否为 `other` 或其子类型
    pub fn is_kind_of(&self, other: ResourceType) -> bool {
        let mut current = Some(*self);
        while let Some(kind) = current {
            if kind == other {
                return true;
            }
            current = kind.parent();
        }
        false
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ResourceType {
    type Err = AuthzError;

    /// 接受 `FeatureView`、`feature_view`、`feature-view` 等写法
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        ALL_RESOURCE_TYPES
            .iter()
            .copied()
            .find(|kind| kind.as_str().to_lowercase() == normalized)
            .ok_or_else(|| AuthzError::UnknownResourceType(s.to_string()))
    }
}

/// 资源实例
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display)]
#[display("{kind}/{name}")]
pub struct Resource {
    pub kind: ResourceType,
    pub name: String,
    /// 所属 namespace (即 project)
    pub namespace: String,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl Resource {
    pub fn new(kind: ResourceType, name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            namespace: namespace.into(),
            tags: BTreeMap::new(),
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}
