//! Job Client Port - 远程检测任务客户端抽象
//!
//! 定义检测服务的任务接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::domain::processing::{ApiBaseUrl, JobId, JobStatus, StatusUpdate};

/// Job Client 错误
#[derive(Debug, Error)]
pub enum JobClientError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    /// 服务端返回了 `error` 字段
    #[error("Job rejected: {0}")]
    Rejected(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// 任务选项（随启动请求发送）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskOptions {
    pub project_id: String,
    pub detect_person: bool,
    pub detect_vehicle: bool,
    pub detect_cone: bool,
    /// 输出 elev_z / height_m 字段
    pub include_elevation: bool,
    /// 地形分析（需要 DSM）
    pub include_terrain: bool,
    pub include_landcover: bool,
    /// 地表变化检测（需要多期数据）
    pub include_change_detection: bool,
    pub output_stats: bool,
    pub output_pdf: bool,
    pub output_gpkg: bool,
}

impl Default for TaskOptions {
    fn default() -> Self {
        Self {
            project_id: "current".to_string(),
            detect_person: true,
            detect_vehicle: true,
            detect_cone: false,
            include_elevation: true,
            include_terrain: false,
            include_landcover: false,
            include_change_detection: false,
            output_stats: true,
            output_pdf: true,
            output_gpkg: false,
        }
    }
}

impl TaskOptions {
    /// 启用的检测类别
    pub fn detection_classes(&self) -> Vec<&'static str> {
        let mut classes = Vec::new();
        if self.detect_vehicle {
            classes.push("car");
        }
        if self.detect_person {
            classes.push("person");
        }
        if self.detect_cone {
            classes.push("cone");
        }
        classes
    }
}

/// 启动任务响应
#[derive(Debug, Clone, PartialEq)]
pub struct StartJobResponse {
    pub job_id: JobId,
    pub status: String,
    pub message: String,
}

/// 任务状态报告
#[derive(Debug, Clone, PartialEq)]
pub struct JobStatusReport {
    pub job_id: JobId,
    pub status: JobStatus,
    pub progress: u8,
    pub current_step: String,
    /// 服务端计算的耗时，仅用于日志
    pub elapsed_seconds: f64,
}

impl JobStatusReport {
    pub fn to_update(&self) -> StatusUpdate {
        StatusUpdate {
            status: self.status,
            progress: self.progress,
            current_step: self.current_step.clone(),
        }
    }
}

/// Job Client Port
///
/// 外部检测服务的任务接口
#[async_trait]
pub trait JobClientPort: Send + Sync {
    /// 启动检测任务
    async fn start_job(&self, options: &TaskOptions) -> Result<StartJobResponse, JobClientError>;

    /// 查询任务状态
    async fn get_job_status(&self, job_id: &JobId) -> Result<JobStatusReport, JobClientError>;

    /// 检测服务根路径是否返回 2xx
    async fn health_check(&self) -> bool;
}

/// 按端点创建客户端
///
/// 每次 `run()` 时调用，保证任务使用启动时的端点
pub trait JobClientFactoryPort: Send + Sync {
    fn connect(&self, base_url: &ApiBaseUrl) -> Result<Arc<dyn JobClientPort>, JobClientError>;
}
