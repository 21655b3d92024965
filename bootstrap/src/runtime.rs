//! 运行时

use fsrbac_config::AppConfig;
use fsrbac_errors::{AppError, AppResult};
use fsrbac_telemetry::{init_metrics, init_tracing, init_tracing_json};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;

/// 运行时配置
pub struct RuntimeConfig {
    pub config_dir: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            config_dir: "config".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// 加载应用配置
    pub fn load(&self) -> AppResult<AppConfig> {
        AppConfig::load(&self.config_dir).map_err(|e| AppError::configuration(e.to_string()))
    }
}

/// 初始化运行时：日志与可选的 Prometheus recorder
pub fn init_runtime(config: &AppConfig) -> AppResult<Option<PrometheusHandle>> {
    let tracing = if config.json_logs() {
        init_tracing_json(&config.telemetry.log_level)
    } else {
        init_tracing(&config.telemetry.log_level)
    };
    tracing.map_err(|e| AppError::configuration(e.to_string()))?;

    let metrics = if config.telemetry.metrics_enabled {
        Some(init_metrics().map_err(|e| AppError::configuration(e.to_string()))?)
    } else {
        None
    };

    info!(
        app_name = %config.app_name,
        app_env = %config.app_env,
        metrics = metrics.is_some(),
        "Runtime initialized"
    );

    Ok(metrics)
}
