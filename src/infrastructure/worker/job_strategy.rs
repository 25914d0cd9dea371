//! Job Strategy - 任务执行策略
//!
//! 控制器在 `run()` 时按执行模式选择一种策略，策略只通过 [`JobHandle`] 修改状态

use async_trait::async_trait;

use super::JobHandle;
use crate::domain::processing::ExecutionMode;

/// 任务执行策略
#[async_trait]
pub trait JobStrategy: Send + Sync {
    fn mode(&self) -> ExecutionMode;

    /// 驱动任务直到结束或 handle 失效
    async fn execute(&self, job: JobHandle);
}
