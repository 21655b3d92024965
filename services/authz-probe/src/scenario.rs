//! 场景文档
//!
//! ```toml
//! namespace = "feast"
//! read_targets = ["call_center_90d"]
//!
//! [[principals]]
//! name = "user1"
//! groups = ["banking-admin"]
//!
//! [[resources]]
//! kind = "FeatureView"
//! name = "call_center_90d"
//! namespace = "feast"
//! ```

use std::path::Path;

use figment::{
    Figment,
    providers::{Format, Toml},
};
use fsrbac_auth_core::PrincipalResolver;
use fsrbac_authz::{Principal, Resource, ResourceType};
use fsrbac_errors::{AppError, AppResult};
use serde::Deserialize;

fn default_namespace() -> String {
    "feast".to_string()
}

fn default_write_entity() -> String {
    "customer".to_string()
}

fn default_write_data_source() -> String {
    "customer_data_source".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// 写操作探测时新建对象所在的 namespace
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// 读取在线/离线特征的 FeatureView 名称
    #[serde(default)]
    pub read_targets: Vec<String>,
    /// 新建 FeatureView 所引用的 Entity
    #[serde(default = "default_write_entity")]
    pub write_entity: String,
    /// 新建 FeatureView 所引用的 DataSource
    #[serde(default = "default_write_data_source")]
    pub write_data_source: String,
    #[serde(default)]
    pub principals: Vec<Principal>,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

impl Scenario {
    pub fn from_toml_str(source: &str) -> AppResult<Self> {
        Self::extract(Figment::from(Toml::string(source)))
    }

    pub fn from_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(AppError::not_found(format!(
                "Scenario document not found: {}",
                path.display()
            )));
        }
        Self::extract(Figment::from(Toml::file(path)))
    }

    fn extract(figment: Figment) -> AppResult<Self> {
        let scenario: Self = figment
            .extract()
            .map_err(|e| AppError::configuration(format!("Invalid scenario: {}", e)))?;
        if scenario.principals.is_empty() {
            return Err(AppError::validation("Scenario defines no principals"));
        }
        Ok(scenario)
    }

    /// 目录中所有 FeatureView 类对象 (含 Batch/Stream)
    pub fn feature_views(&self) -> impl Iterator<Item = &Resource> {
        self.resources
            .iter()
            .filter(|r| r.kind.is_kind_of(ResourceType::FeatureView))
    }

    pub fn feature_view(&self, name: &str) -> Option<&Resource> {
        self.feature_views().find(|r| r.name == name)
    }

    pub fn find(&self, kind: ResourceType, name: &str) -> Option<&Resource> {
        self.resources
            .iter()
            .find(|r| r.kind.is_kind_of(kind) && r.name == name)
    }

    /// 经令牌往返解析调用方，模拟客户端携带 JWT 的请求路径
    pub fn resolve_principals<F>(
        &self,
        resolver: &dyn PrincipalResolver,
        mint: F,
    ) -> AppResult<Vec<Principal>>
    where
        F: Fn(&Principal) -> AppResult<String>,
    {
        self.principals
            .iter()
            .map(|principal| resolver.resolve(&mint(principal)?))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"
read_targets = ["call_center_90d"]

[[principals]]
name = "user1"
groups = ["banking-admin"]

[[principals]]
name = "user5"
groups = ["restricted-user"]

[[resources]]
kind = "FeatureView"
name = "call_center_90d"
namespace = "feast"

[[resources]]
kind = "BatchFeatureView"
name = "atm_usage_30d"
namespace = "feast"

[[resources]]
kind = "Entity"
name = "customer"
namespace = "feast"
"#;

    #[test]
    fn test_parse_scenario() {
        let scenario = Scenario::from_toml_str(SCENARIO).unwrap();
        assert_eq!(scenario.namespace, "feast");
        assert_eq!(scenario.principals.len(), 2);
        assert!(scenario.principals[1].in_group("restricted-user"));
        assert_eq!(scenario.feature_views().count(), 2);
        assert!(scenario.feature_view("atm_usage_30d").is_some());
        assert!(scenario.feature_view("customer").is_none());
        assert_eq!(scenario.write_entity, "customer");
        assert!(scenario.find(ResourceType::Entity, "customer").is_some());
        assert!(scenario.find(ResourceType::DataSource, "customer").is_none());
    }

    #[test]
    fn test_scenario_requires_principals() {
        let err = Scenario::from_toml_str("read_targets = []").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_missing_scenario_file() {
        let err = Scenario::from_path("does/not/exist.toml").unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
