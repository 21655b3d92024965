//! 特征仓库客户端操作到 (资源类型, 操作) 的映射

use crate::action::AuthzedAction;
use crate::engine::DecisionEngine;
use crate::error::{AuthzError, AuthzResult};
use crate::principal::Principal;
use crate::resource::{Resource, ResourceType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientOperation {
    ListFeatureViews,
    ListEntities,
    ListFeatureServices,
    ListDataSources,
    GetFeatureView,
    GetEntity,
    GetFeatureService,
    GetDataSource,
    GetHistoricalFeatures,
    GetOnlineFeatures,
    MaterializeIncremental,
    WriteToOfflineStore,
    /// 注册或更新对象；`existing` 决定需要 UPDATE 还是 CREATE
    Apply { kind: ResourceType, existing: bool },
    DeleteFeatureView,
}

impl ClientOperation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ListFeatureViews => "list_feature_views",
            Self::ListEntities => "list_entities",
            Self::ListFeatureServices => "list_feature_services",
            Self::ListDataSources => "list_data_sources",
            Self::GetFeatureView => "get_feature_view",
            Self::GetEntity => "get_entity",
            Self::GetFeatureService => "get_feature_service",
            Self::GetDataSource => "get_data_source",
            Self::GetHistoricalFeatures => "get_historical_features",
            Self::GetOnlineFeatures => "get_online_features",
            Self::MaterializeIncremental => "materialize_incremental",
            Self::WriteToOfflineStore => "write_to_offline_store",
            Self::Apply { .. } => "apply",
            Self::DeleteFeatureView => "delete_feature_view",
        }
    }

    pub fn resource_type(&self) -> ResourceType {
        match self {
            Self::ListEntities | Self::GetEntity => ResourceType::Entity,
            Self::ListFeatureServices | Self::GetFeatureService => ResourceType::FeatureService,
            Self::ListDataSources | Self::GetDataSource => ResourceType::DataSource,
            Self::Apply { kind, .. } => *kind,
            Self::ListFeatureViews
            | Self::GetFeatureView
            | Self::GetHistoricalFeatures
            | Self::GetOnlineFeatures
            | Self::MaterializeIncremental
            | Self::WriteToOfflineStore
            | Self::DeleteFeatureView => ResourceType::FeatureView,
        }
    }

    pub fn required_actions(&self) -> Vec<AuthzedAction> {
        match self {
            Self::ListFeatureViews
            | Self::ListEntities
            | Self::ListFeatureServices
            | Self::ListDataSources
            | Self::GetFeatureView
            | Self::GetEntity
            | Self::GetFeatureService
            | Self::GetDataSource => vec![AuthzedAction::Describe],
            Self::GetHistoricalFeatures => vec![AuthzedAction::ReadOffline],
            Self::GetOnlineFeatures => vec![AuthzedAction::ReadOnline],
            Self::MaterializeIncremental => vec![AuthzedAction::WriteOnline],
            Self::WriteToOfflineStore => vec![AuthzedAction::WriteOffline],
            Self::Apply { existing: true, .. } => vec![AuthzedAction::Update],
            Self::Apply { existing: false, .. } => vec![AuthzedAction::Create],
            Self::DeleteFeatureView => vec![AuthzedAction::Delete],
        }
    }

    /// list 操作只过滤结果，不报错
    pub fn is_listing(&self) -> bool {
        matches!(
            self,
            Self::ListFeatureViews
                | Self::ListEntities
                | Self::ListFeatureServices
                | Self::ListDataSources
        )
    }

    /// 对单个目标对象断言授权
    pub fn authorize(
        &self,
        engine: &DecisionEngine,
        principal: &Principal,
        target: &Resource,
    ) -> AuthzResult<()> {
        if !target.kind.is_kind_of(self.resource_type()) {
            return Err(AuthzError::OperationMismatch {
                operation: self.name().to_string(),
                expected: self.resource_type().to_string(),
                actual: target.kind.to_string(),
            });
        }
        engine.check_all(principal, target, &self.required_actions())
    }

    /// list 操作可见的对象
    pub fn visible<'a, I>(
        &self,
        engine: &DecisionEngine,
        principal: &Principal,
        catalog: I,
    ) -> Vec<&'a Resource>
    where
        I: IntoIterator<Item = &'a Resource>,
    {
        let kind = self.resource_type();
        engine.filter_resources(
            principal,
            catalog.into_iter().filter(|r| r.kind.is_kind_of(kind)),
            &self.required_actions(),
        )
    }
}

impl std::fmt::Display for ClientOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
