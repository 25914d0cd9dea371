//! Processing Controller Port - 任务生命周期入口
//!
//! UI 触发层只通过此端口驱动任务，具体实现在 infrastructure/worker 层

use serde::Serialize;

use super::TaskOptions;
use crate::domain::processing::{ApiBaseUrl, ExecutionMode, ProcessingSnapshot};

/// `run()` 的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// 新任务已开始
    Started { mode: ExecutionMode, generation: u64 },
    /// 已有任务进行中，本次调用被忽略
    AlreadyRunning,
    /// 无法开始，状态回到 idle
    StartFailed { reason: String },
}

/// 当前端点配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointSettings {
    pub url: Option<ApiBaseUrl>,
    pub force_mock: bool,
    pub mode: ExecutionMode,
}

/// Processing Controller Port
///
/// 任务状态的唯一写入者
pub trait ProcessingControllerPort: Send + Sync {
    /// 开始任务；`None` 使用配置中的默认任务选项
    fn run(&self, options: Option<TaskOptions>) -> RunOutcome;

    /// 取消进行中的任务并恢复初始状态
    fn reset(&self);

    /// 当前状态快照
    fn snapshot(&self) -> ProcessingSnapshot;

    /// 当前端点配置
    fn endpoint(&self) -> EndpointSettings;

    /// 修改检测服务端点（只影响之后的 `run()`）
    fn set_endpoint(&self, url: Option<ApiBaseUrl>);

    /// 强制 mock 模式（只影响之后的 `run()`）
    fn set_force_mock(&self, force_mock: bool);
}
