//! 探测执行

use fsrbac_authz::{AuthzError, ClientOperation, DecisionEngine, Principal, Resource, ResourceType};
use tracing::{debug, info};

use crate::report::{OperationResult, ProbeReport, Section};
use crate::scenario::Scenario;

const LIST_OPERATIONS: [ClientOperation; 4] = [
    ClientOperation::ListFeatureViews,
    ClientOperation::ListEntities,
    ClientOperation::ListFeatureServices,
    ClientOperation::ListDataSources,
];

/// 在一个场景上为调用方执行全部客户端操作
pub struct Probe<'a> {
    engine: &'a DecisionEngine,
    scenario: &'a Scenario,
}

impl<'a> Probe<'a> {
    pub fn new(engine: &'a DecisionEngine, scenario: &'a Scenario) -> Self {
        Self { engine, scenario }
    }

    pub fn run_all(&self, principals: &[Principal]) -> Vec<ProbeReport> {
        principals.iter().map(|p| self.run(p)).collect()
    }

    /// 拒绝只记录在报告中，不会中断后续操作
    pub fn run(&self, principal: &Principal) -> ProbeReport {
        info!(principal = %principal, groups = ?principal.groups, "Probing principal");
        let mut report = ProbeReport::new(principal.name.clone());

        for operation in LIST_OPERATIONS {
            report.push(self.list(principal, operation));
        }

        for target in &self.scenario.read_targets {
            report.push(self.read(
                principal,
                Section::Historical,
                ClientOperation::GetHistoricalFeatures,
                target,
            ));
        }
        for target in &self.scenario.read_targets {
            report.push(self.read(
                principal,
                Section::Online,
                ClientOperation::GetOnlineFeatures,
                target,
            ));
        }

        self.materialize(principal, &mut report);
        self.write(principal, &mut report);

        debug!(
            principal = %principal,
            passed = report.passed(),
            total = report.total(),
            "Probe finished"
        );
        report
    }

    fn list(&self, principal: &Principal, operation: ClientOperation) -> OperationResult {
        let visible: Vec<String> = operation
            .visible(self.engine, principal, &self.scenario.resources)
            .into_iter()
            .map(|r| r.name.clone())
            .collect();
        let message = format!("Found {} visible {}", visible.len(), operation.resource_type());

        if visible.is_empty() {
            OperationResult::failed(Section::List, operation.name(), message)
        } else {
            OperationResult::passed(Section::List, operation.name(), message).with_items(visible)
        }
    }

    fn read(
        &self,
        principal: &Principal,
        section: Section,
        operation: ClientOperation,
        target: &str,
    ) -> OperationResult {
        let label = format!("{}({})", operation.name(), target);
        match self.scenario.feature_view(target) {
            Some(view) => outcome(section, label, operation.authorize(self.engine, principal, view)),
            None => OperationResult::failed(
                section,
                label,
                format!("Error: feature view '{}' not in catalog", target),
            ),
        }
    }

    /// 只物化调用方 list 可见的 FeatureView，排除写操作自建的对象
    fn materialize(&self, principal: &Principal, report: &mut ProbeReport) {
        let own_view = test_view_name(principal);
        let visible = ClientOperation::ListFeatureViews.visible(
            self.engine,
            principal,
            &self.scenario.resources,
        );
        for view in visible.into_iter().filter(|v| v.name != own_view) {
            match ClientOperation::MaterializeIncremental.authorize(self.engine, principal, view) {
                Ok(()) => report.materialization.materialized.push(view.name.clone()),
                Err(e) => report
                    .materialization
                    .failed
                    .push((view.name.clone(), e.to_string())),
            }
        }
    }

    /// 依赖对象 -> 定义 -> apply -> 验证/读取 -> 删除，前一步失败则后续跳过
    fn write(&self, principal: &Principal, report: &mut ProbeReport) {
        let view = Resource::new(
            ResourceType::FeatureView,
            test_view_name(principal),
            self.scenario.namespace.clone(),
        );

        let entity = self.dependency(
            principal,
            ClientOperation::GetEntity,
            ResourceType::Entity,
            &self.scenario.write_entity,
        );
        let data_source = self.dependency(
            principal,
            ClientOperation::GetDataSource,
            ResourceType::DataSource,
            &self.scenario.write_data_source,
        );
        let mut ready = entity.passed && data_source.passed;
        let missing = if !entity.passed {
            format!("Could not get entity '{}'", self.scenario.write_entity)
        } else {
            format!("Could not get data source '{}'", self.scenario.write_data_source)
        };
        report.push(entity);
        report.push(data_source);

        let label = format!("create_feature_view({})", view.name);
        report.push(if ready {
            OperationResult::passed(Section::Write, label, "FeatureView defined")
        } else {
            OperationResult::failed(Section::Write, label, missing)
        });

        let steps = [
            (
                Section::Write,
                ClientOperation::Apply {
                    kind: ResourceType::FeatureView,
                    existing: false,
                },
                "apply_feature_view",
            ),
            (Section::Write, ClientOperation::GetFeatureView, "verify_feature_view"),
            (
                Section::Write,
                ClientOperation::GetHistoricalFeatures,
                "retrieve_from_created_fv",
            ),
            (Section::Cleanup, ClientOperation::DeleteFeatureView, "delete_feature_view"),
        ];
        for (index, (section, operation, label)) in steps.into_iter().enumerate() {
            let label = format!("{}({})", label, view.name);
            if !ready {
                report.push(OperationResult::failed(
                    section,
                    label,
                    "Skipped: feature view was not applied",
                ));
                continue;
            }
            let result = outcome(
                section,
                label,
                operation.authorize(self.engine, principal, &view),
            );
            // apply 失败后无对象可验证或删除
            if index == 0 && !result.passed {
                ready = false;
            }
            report.push(result);
        }
    }

    fn dependency(
        &self,
        principal: &Principal,
        operation: ClientOperation,
        kind: ResourceType,
        name: &str,
    ) -> OperationResult {
        let label = format!("{}({})", operation.name(), name);
        match self.scenario.find(kind, name) {
            Some(target) => outcome(
                Section::Write,
                label,
                operation.authorize(self.engine, principal, target),
            ),
            None => OperationResult::failed(
                Section::Write,
                label,
                format!("Error: {} '{}' not in catalog", kind, name),
            ),
        }
    }
}

fn test_view_name(principal: &Principal) -> String {
    format!("rbac_test_{}_fv", principal.name)
}

fn outcome(section: Section, label: String, result: Result<(), AuthzError>) -> OperationResult {
    match result {
        Ok(()) => OperationResult::passed(section, label, "Authorized"),
        Err(e) if e.is_permission_denied() => {
            OperationResult::failed(section, label, format!("RBAC blocked: {}", e))
        }
        Err(e) => OperationResult::failed(section, label, format!("Error: {}", e)),
    }
}
