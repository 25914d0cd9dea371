//! Processing Commands - 任务生命周期命令

use serde::Serialize;

use crate::application::ports::TaskOptions;
use crate::domain::processing::ExecutionMode;

/// 开始处理任务命令
#[derive(Debug, Clone, Default)]
pub struct RunProcessingCommand {
    /// `None` 时使用配置中的默认任务选项
    pub options: Option<TaskOptions>,
}

/// 开始处理任务响应
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunProcessingResponse {
    pub accepted: bool,
    pub mode: ExecutionMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// 重置处理状态命令
#[derive(Debug, Clone, Default)]
pub struct ResetProcessingCommand;

/// 修改检测服务端点命令
///
/// 字段为 `None` 时保持不变；`url` 为空字符串表示清除端点
#[derive(Debug, Clone, Default)]
pub struct ConfigureEndpointCommand {
    pub url: Option<String>,
    pub force_mock: Option<bool>,
}
