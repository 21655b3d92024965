//! 探测报告

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    List,
    Historical,
    Online,
    Write,
    Cleanup,
}

impl Section {
    pub fn title(&self) -> &'static str {
        match self {
            Self::List => "READ OPERATIONS - List Resources",
            Self::Historical => "READ OPERATIONS - Historical Features",
            Self::Online => "READ OPERATIONS - Online Features",
            Self::Write => "WRITE OPERATIONS - Create FeatureView",
            Self::Cleanup => "WRITE OPERATIONS - Cleanup",
        }
    }
}

/// 单个操作的探测结果
#[derive(Debug, Clone)]
pub struct OperationResult {
    pub section: Section,
    pub label: String,
    pub passed: bool,
    pub message: String,
    /// list 操作可见的对象名
    pub items: Vec<String>,
}

impl OperationResult {
    pub fn passed(section: Section, label: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            section,
            label: label.into(),
            passed: true,
            message: message.into(),
            items: Vec::new(),
        }
    }

    pub fn failed(section: Section, label: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            passed: false,
            ..Self::passed(section, label, message)
        }
    }

    pub fn with_items(mut self, items: Vec<String>) -> Self {
        self.items = items;
        self
    }
}

/// 逐个 FeatureView 物化的结果
#[derive(Debug, Clone, Default)]
pub struct MaterializationSummary {
    pub materialized: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl MaterializationSummary {
    pub fn total(&self) -> usize {
        self.materialized.len() + self.failed.len()
    }

    pub fn success(&self) -> bool {
        !self.materialized.is_empty()
    }
}

/// 单个调用方的探测报告
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub principal: String,
    pub results: Vec<OperationResult>,
    pub materialization: MaterializationSummary,
}

impl ProbeReport {
    pub fn new(principal: impl Into<String>) -> Self {
        Self {
            principal: principal.into(),
            results: Vec::new(),
            materialization: MaterializationSummary::default(),
        }
    }

    pub fn push(&mut self, result: OperationResult) {
        self.results.push(result);
    }

    pub fn result(&self, label: &str) -> Option<&OperationResult> {
        self.results.iter().find(|r| r.label == label)
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    pub fn success_rate(&self) -> Option<f64> {
        rate(self.passed(), self.total())
    }
}

fn rate(part: usize, total: usize) -> Option<f64> {
    (total > 0).then(|| part as f64 / total as f64 * 100.0)
}

const RULE: &str =
    "================================================================================";
const THIN_RULE: &str =
    "--------------------------------------------------------------------------------";

fn section_header(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f, "\n📋 {}", title)?;
    writeln!(f, "{}", THIN_RULE)
}

impl fmt::Display for ProbeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n{}", RULE)?;
        writeln!(f, "🔐 RBAC PROBE")?;
        writeln!(f, "{}", RULE)?;
        writeln!(f, "\n👤 Testing as user: {}", self.principal)?;

        let mut current = None;
        let mut materialization_written = false;
        for result in &self.results {
            if current != Some(result.section) {
                // 物化结果放在读操作之后、写操作之前
                if result.section == Section::Write && !materialization_written {
                    write_materialization(f, &self.materialization)?;
                    materialization_written = true;
                }
                section_header(f, result.section.title())?;
                current = Some(result.section);
            }
            let status = if result.passed { "✅ SUCCESS" } else { "❌ FAILED" };
            writeln!(f, "  {}: {}", status, result.label)?;
            if !result.message.is_empty() {
                writeln!(f, "    {}", result.message)?;
            }
            for item in &result.items {
                writeln!(f, "    - {}", item)?;
            }
        }

        if !materialization_written {
            write_materialization(f, &self.materialization)?;
        }

        section_header(f, "TEST SUMMARY")?;
        writeln!(f, "\n📊 Results for {}:", self.principal)?;
        writeln!(f, "   ✅ Passed: {}/{}", self.passed(), self.total())?;
        writeln!(f, "   ❌ Failed: {}/{}", self.failed(), self.total())?;
        if let Some(rate) = self.success_rate() {
            writeln!(f, "   📈 Success Rate: {:.1}%", rate)?;
        }

        let m = &self.materialization;
        writeln!(f, "\n📦 Materialization Results:")?;
        writeln!(f, "   ✅ Materialized: {} feature views", m.materialized.len())?;
        writeln!(f, "   ❌ Failed: {} feature views", m.failed.len())?;
        if let Some(rate) = rate(m.materialized.len(), m.total()) {
            writeln!(f, "   📈 Success Rate: {:.1}%", rate)?;
        }

        writeln!(f, "\n📋 Detailed Results:")?;
        for result in &self.results {
            let status = if result.passed { "✅" } else { "❌" };
            writeln!(f, "   {} {}", status, result.label)?;
        }

        writeln!(f, "\n{}", RULE)?;
        writeln!(f, "TEST COMPLETE")?;
        write!(f, "{}", RULE)
    }
}

fn write_materialization(f: &mut fmt::Formatter<'_>, m: &MaterializationSummary) -> fmt::Result {
    section_header(f, "MATERIALIZATION OPERATIONS - Materialize Feature Views")?;
    for name in &m.materialized {
        writeln!(f, "    ✅ '{}' materialized", name)?;
    }
    for (name, error) in &m.failed {
        writeln!(f, "    ❌ '{}' failed: {}", name, error)?;
    }
    Ok(())
}
