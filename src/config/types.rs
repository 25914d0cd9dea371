//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::time::Duration;

use crate::application::ports::TaskOptions;
use crate::domain::processing::{ApiBaseUrl, ProcessingError};

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 检测服务配置
    #[serde(default)]
    pub detection: DetectionConfig,

    /// 任务处理配置
    #[serde(default)]
    pub processing: ProcessingConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 检测服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionConfig {
    /// 检测服务基础 URL，留空使用 mock 模式
    #[serde(default)]
    pub url: String,

    /// 单次请求超时时间（秒）
    #[serde(default = "default_detection_timeout")]
    pub timeout_secs: u64,

    /// 即使配置了 URL 也使用 mock 模式
    #[serde(default)]
    pub force_mock: bool,
}

fn default_detection_timeout() -> u64 {
    30
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: default_detection_timeout(),
            force_mock: false,
        }
    }
}

impl DetectionConfig {
    /// 解析后的端点，未配置时为 `None`
    pub fn endpoint(&self) -> Result<Option<ApiBaseUrl>, ProcessingError> {
        ApiBaseUrl::parse(&self.url)
    }
}

/// 任务处理配置
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessingConfig {
    /// 远程模式轮询间隔（毫秒）
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// mock 模式每个步骤的耗时（毫秒）
    #[serde(default = "default_mock_step_durations_ms")]
    pub mock_step_durations_ms: Vec<u64>,

    /// 连续轮询失败上限，0 表示不限
    #[serde(default = "default_max_consecutive_poll_failures")]
    pub max_consecutive_poll_failures: u32,

    /// 单个任务的轮询总时长上限（秒），0 表示不限
    #[serde(default = "default_max_poll_secs")]
    pub max_poll_secs: u64,

    /// 默认任务选项
    #[serde(default)]
    pub task_options: TaskOptions,
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_mock_step_durations_ms() -> Vec<u64> {
    vec![700, 400, 500, 600, 500]
}

fn default_max_consecutive_poll_failures() -> u32 {
    30
}

fn default_max_poll_secs() -> u64 {
    1800 // 30 分钟
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            mock_step_durations_ms: default_mock_step_durations_ms(),
            max_consecutive_poll_failures: default_max_consecutive_poll_failures(),
            max_poll_secs: default_max_poll_secs(),
            task_options: TaskOptions::default(),
        }
    }
}

impl ProcessingConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn mock_step_durations(&self) -> Vec<Duration> {
        self.mock_step_durations_ms
            .iter()
            .copied()
            .map(Duration::from_millis)
            .collect()
    }

    pub fn max_poll_duration(&self) -> Option<Duration> {
        (self.max_poll_secs > 0).then(|| Duration::from_secs(self.max_poll_secs))
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5080);
        assert!(config.detection.url.is_empty());
        assert_eq!(config.processing.mock_step_durations_ms.len(), 5);
        assert_eq!(config.processing.task_options.project_id, "current");
    }

    #[test]
    fn test_server_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "0.0.0.0:5080");
    }

    #[test]
    fn test_detection_endpoint() {
        let mut config = DetectionConfig::default();
        assert!(config.endpoint().unwrap().is_none());

        config.url = "http://gpu-box:7860/".to_string();
        assert_eq!(
            config.endpoint().unwrap().unwrap().as_str(),
            "http://gpu-box:7860"
        );

        config.url = "gpu-box:7860".to_string();
        assert!(config.endpoint().is_err());
    }

    #[test]
    fn test_processing_durations() {
        let mut config = ProcessingConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(
            config.mock_step_durations().iter().sum::<Duration>(),
            Duration::from_millis(2700)
        );
        assert_eq!(config.max_poll_duration(), Some(Duration::from_secs(1800)));

        config.max_poll_secs = 0;
        assert_eq!(config.max_poll_duration(), None);
    }
}
