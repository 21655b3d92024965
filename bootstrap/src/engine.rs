//! 决策引擎装配

use std::sync::Arc;

use fsrbac_auth_core::TokenService;
use fsrbac_authz::{DecisionEngine, PermissionSet, Preset};
use fsrbac_config::AppConfig;
use fsrbac_errors::{AppError, AppResult};
use secrecy::ExposeSecret;
use tracing::info;

/// 按配置加载权限集合 (文档路径或内置预设)
pub fn load_permissions(config: &AppConfig) -> AppResult<Arc<PermissionSet>> {
    let permissions = match (&config.permissions.path, &config.permissions.preset) {
        (Some(path), None) => PermissionSet::from_path(path)?,
        (None, Some(preset)) => {
            let preset: Preset = preset.parse()?;
            let set = preset.build()?;
            info!(preset = %preset, permissions = set.len(), "Permissions loaded from preset");
            set
        }
        (Some(_), Some(_)) => {
            return Err(AppError::configuration(
                "permissions.path and permissions.preset are mutually exclusive",
            ));
        }
        (None, None) => {
            return Err(AppError::configuration("No permission source configured"));
        }
    };

    Ok(Arc::new(permissions))
}

/// 构建决策引擎
pub fn build_engine(config: &AppConfig) -> AppResult<DecisionEngine> {
    Ok(DecisionEngine::new(load_permissions(config)?))
}

/// 配置了 JWT 时构建令牌解析器
pub fn build_token_service(config: &AppConfig) -> Option<TokenService> {
    config.jwt.as_ref().map(|jwt| {
        TokenService::new(
            jwt.secret.expose_secret(),
            jwt.expires_in,
            jwt.issuer.clone(),
            jwt.audience.clone(),
        )
    })
}
