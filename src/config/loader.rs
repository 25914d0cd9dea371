//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;
use crate::domain::processing::PIPELINE_STEPS;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `AEROLENS_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `AEROLENS_SERVER__PORT=8080`
/// - `AEROLENS_DETECTION__URL=http://gpu-box:7860`
/// - `AEROLENS_DETECTION__FORCE_MOCK=true`
/// - `AEROLENS_PROCESSING__POLL_INTERVAL_MS=2000`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    // mock_step_durations_ms 与 task_options 的默认值由 serde 提供
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5080)?
        .set_default("detection.url", "")?
        .set_default("detection.timeout_secs", 30)?
        .set_default("detection.force_mock", false)?
        .set_default("processing.poll_interval_ms", 1000)?
        .set_default("processing.max_consecutive_poll_failures", 30)?
        .set_default("processing.max_poll_secs", 1800)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 例如: AEROLENS_DETECTION__URL=http://gpu-box:7860
    builder = builder.add_source(
        Environment::with_prefix("AEROLENS")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.processing.poll_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "Poll interval cannot be 0".to_string(),
        ));
    }

    if config.processing.mock_step_durations_ms.len() != PIPELINE_STEPS.len() {
        return Err(ConfigError::ValidationError(format!(
            "Expected {} mock step durations, got {}",
            PIPELINE_STEPS.len(),
            config.processing.mock_step_durations_ms.len()
        )));
    }

    config
        .detection
        .endpoint()
        .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    if config.detection.url.is_empty() {
        tracing::info!("Detection URL: (not set, mock mode)");
    } else {
        tracing::info!("Detection URL: {}", config.detection.url);
    }
    tracing::info!("Detection Timeout: {}s", config.detection.timeout_secs);
    tracing::info!("Force Mock: {}", config.detection.force_mock);
    tracing::info!("Poll Interval: {}ms", config.processing.poll_interval_ms);
    tracing::info!(
        "Mock Step Durations: {:?}ms",
        config.processing.mock_step_durations_ms
    );
    tracing::info!(
        "Max Consecutive Poll Failures: {}",
        config.processing.max_consecutive_poll_failures
    );
    tracing::info!("Max Poll Duration: {}s", config.processing.max_poll_secs);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_poll_interval() {
        let mut config = AppConfig::default();
        config.processing.poll_interval_ms = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_mock_duration_count() {
        let mut config = AppConfig::default();
        config.processing.mock_step_durations_ms = vec![100, 100];
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_bad_detection_url() {
        let mut config = AppConfig::default();
        config.detection.url = "ftp://gpu-box".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9090

[detection]
url = "http://gpu-box:7860/"
force_mock = true

[processing]
poll_interval_ms = 250
mock_step_durations_ms = [10, 20, 30, 40, 50]

[processing.task_options]
project_id = "site-7"
detect_cone = true
"#
        )
        .unwrap();

        let config = load_config_from_path(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(config.detection.force_mock);
        assert_eq!(
            config.detection.endpoint().unwrap().unwrap().as_str(),
            "http://gpu-box:7860"
        );
        assert_eq!(config.processing.poll_interval_ms, 250);
        assert_eq!(config.processing.max_consecutive_poll_failures, 30);
        assert_eq!(config.processing.task_options.project_id, "site-7");
        assert!(config.processing.task_options.detect_cone);
        assert!(config.processing.task_options.detect_person);
    }

    #[test]
    fn test_load_from_file_rejects_invalid() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[processing]\npoll_interval_ms = 0").unwrap();

        assert!(matches!(
            load_config_from_path(Some(file.path())),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
