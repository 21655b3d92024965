//! fsrbac-config - 配置加载库

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;
use thiserror::Error;

use secrecy::Secret;

/// 环境变量前缀，层级用 `__` 分隔 (例如 `FSRBAC_TELEMETRY__LOG_LEVEL`)
pub const ENV_PREFIX: &str = "FSRBAC_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] figment::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// 遥测配置
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// 未设置时生产环境使用 JSON 日志
    pub json: Option<bool>,
    #[serde(default)]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json: None,
            metrics_enabled: false,
        }
    }
}

/// 权限来源：声明文档路径或内置预设，二选一
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PermissionsConfig {
    pub path: Option<String>,
    pub preset: Option<String>,
}

/// JWT 配置
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: Secret<String>,
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
    #[serde(default = "default_issuer")]
    pub issuer: String,
    #[serde(default = "default_audience")]
    pub audience: String,
}

fn default_expires_in() -> i64 {
    3600
}

fn default_issuer() -> String {
    "fsrbac".to_string()
}

fn default_audience() -> String {
    "feature-store".to_string()
}

/// 探测工具配置
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    #[serde(default = "default_scenario_path")]
    pub scenario_path: String,
}

fn default_scenario_path() -> String {
    "config/scenarios.toml".to_string()
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            scenario_path: default_scenario_path(),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app_name: String,
    #[serde(default = "default_app_env")]
    pub app_env: String,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub permissions: PermissionsConfig,
    pub jwt: Option<JwtConfig>,
    #[serde(default)]
    pub probe: ProbeConfig,
}

fn default_app_env() -> String {
    "development".to_string()
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| default_app_env());

        let config: Self = Figment::new()
            .merge(Toml::file(format!("{}/default.toml", config_dir)))
            .merge(Toml::file(format!("{}/{}.toml", config_dir, env)))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match (&self.permissions.path, &self.permissions.preset) {
            (Some(_), Some(_)) => Err(ConfigError::Invalid(
                "permissions.path and permissions.preset are mutually exclusive".to_string(),
            )),
            (None, None) => Err(ConfigError::Invalid(
                "either permissions.path or permissions.preset must be set".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }

    /// 是否输出 JSON 日志
    pub fn json_logs(&self) -> bool {
        self.telemetry.json.unwrap_or_else(|| self.is_production())
    }
}
