//! Processing Queries - 任务状态查询

use serde::Serialize;

use crate::domain::processing::ExecutionMode;

/// 获取当前处理状态
#[derive(Debug, Clone, Default)]
pub struct GetProcessingState;

/// 获取当前端点配置
#[derive(Debug, Clone, Default)]
pub struct GetEndpoint;

/// 检查检测服务是否可连接
#[derive(Debug, Clone, Default)]
pub struct CheckDetectionHealth;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectionHealth {
    pub url: Option<String>,
    pub mode: ExecutionMode,
    /// mock 模式不访问网络，恒为 true
    pub connected: bool,
}
