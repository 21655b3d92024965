//! 资源名称模式
//!
//! 加载时编译一次，匹配时按整串锚定 (full match)，而不是子串搜索。

use fancy_regex::Regex;
use serde::{Serialize, Serializer};
use tracing::warn;

use crate::error::{AuthzError, AuthzResult};

#[derive(Debug, Clone)]
pub struct NamePattern {
    source: String,
    compiled: Regex,
}

impl NamePattern {
    /// 先单独编译原始模式，避免 `a)|(b` 这类模式闭合外层分组后逃逸锚定
    pub fn new(source: impl Into<String>) -> AuthzResult<Self> {
        let source = source.into();
        let invalid = |e: fancy_regex::Error| AuthzError::InvalidNamePattern {
            pattern: source.clone(),
            reason: e.to_string(),
        };
        Regex::new(&source).map_err(invalid)?;
        let compiled = Regex::new(&format!("^(?:{})$", source)).map_err(invalid)?;
        Ok(Self { source, compiled })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// 整串匹配
    ///
    /// 回溯超限视为不匹配 (fail-closed)。
    pub fn is_match(&self, name: &str) -> bool {
        match self.compiled.is_match(name) {
            Ok(matched) => matched,
            Err(e) => {
                warn!(pattern = %self.source, name, error = %e, "Name pattern evaluation failed");
                false
            }
        }
    }
}

impl PartialEq for NamePattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for NamePattern {}

impl std::fmt::Display for NamePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

impl Serialize for NamePattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_lookahead_excludes_transaction() {
        let pattern = NamePattern::new("^(?!.*transaction).*").unwrap();

        assert!(!pattern.is_match("transaction_summary"));
        assert!(!pattern.is_match("customer_transaction_interaction"));
        assert!(!pattern.is_match("transaction_details"));
        assert!(pattern.is_match("customer_profile"));
        assert!(pattern.is_match("call_center_90d"));
    }

    #[test]
    fn test_full_string_anchoring() {
        let pattern = NamePattern::new("customer_.*_fv").unwrap();

        assert!(pattern.is_match("customer_demographics_fv"));
        // 子串命中不算
        assert!(!pattern.is_match("old_customer_demographics_fv"));
        assert!(!pattern.is_match("customer_demographics_fv_v2"));
    }

    #[test]
    fn test_alternation_is_anchored_as_a_whole() {
        let pattern = NamePattern::new("atm_.*|branch_.*").unwrap();

        assert!(pattern.is_match("atm_usage_30d"));
        assert!(pattern.is_match("branch_performance"));
        assert!(!pattern.is_match("customer_atm_interaction"));
    }

    #[test]
    fn test_group_breakout_rejected() {
        let err = NamePattern::new("call)|(.*_fv").unwrap_err();
        assert!(matches!(err, AuthzError::InvalidNamePattern { .. }));

        let err = NamePattern::new("a)(b").unwrap_err();
        assert!(matches!(err, AuthzError::InvalidNamePattern { .. }));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = NamePattern::new("customer_(").unwrap_err();
        assert!(matches!(err, AuthzError::InvalidNamePattern { .. }));
    }
}
