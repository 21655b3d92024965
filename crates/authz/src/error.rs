use std::path::PathBuf;

use fsrbac_errors::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthzError {
    /// 决策引擎返回 deny
    #[error("Permission denied: {principal} cannot {actions} {resource} ({reason})")]
    PermissionDenied {
        principal: String,
        resource: String,
        actions: String,
        reason: String,
    },
    #[error("Duplicate permission name: {0}")]
    DuplicatePermission(String),
    #[error("Invalid permission '{name}': {reason}")]
    InvalidPermission { name: String, reason: String },
    #[error("Invalid name pattern '{pattern}': {reason}")]
    InvalidNamePattern { pattern: String, reason: String },
    #[error("Unknown action: {0}")]
    UnknownAction(String),
    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),
    #[error("Operation {operation} applies to {expected}, not {actual}")]
    OperationMismatch {
        operation: String,
        expected: String,
        actual: String,
    },
    #[error("Unknown permission preset: {0}")]
    UnknownPreset(String),
    #[error("Permissions document not found: {}", .0.display())]
    DocumentNotFound(PathBuf),
    #[error("Failed to load permissions document: {0}")]
    Load(#[from] figment::Error),
}

impl AuthzError {
    pub fn invalid_permission(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPermission {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }
}

impl From<AuthzError> for AppError {
    fn from(error: AuthzError) -> Self {
        match error {
            AuthzError::PermissionDenied { .. } => AppError::Forbidden(error.to_string()),
            AuthzError::DuplicatePermission(_) => AppError::Conflict(error.to_string()),
            AuthzError::InvalidPermission { .. }
            | AuthzError::InvalidNamePattern { .. }
            | AuthzError::UnknownAction(_)
            | AuthzError::UnknownResourceType(_)
            | AuthzError::OperationMismatch { .. } => AppError::Validation(error.to_string()),
            AuthzError::UnknownPreset(_) | AuthzError::DocumentNotFound(_) => {
                AppError::NotFound(error.to_string())
            }
            AuthzError::Load(e) => AppError::Configuration(e.to_string()),
        }
    }
}

pub type AuthzResult<T> = Result<T, AuthzError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denial_becomes_forbidden() {
        let err = AuthzError::PermissionDenied {
            principal: "carol".to_string(),
            resource: "FeatureView/transaction_details".to_string(),
            actions: "READ_OFFLINE".to_string(),
            reason: "no permission grants the requested actions".to_string(),
        };
        assert!(err.is_permission_denied());

        let app: AppError = err.into();
        assert!(app.is_forbidden());
        assert!(app.to_string().contains("FeatureView/transaction_details"));
    }

    #[test]
    fn test_duplicate_becomes_conflict() {
        let app: AppError = AuthzError::DuplicatePermission("admin_permissions".to_string()).into();
        assert_eq!(app.status_code(), 409);
    }
}
