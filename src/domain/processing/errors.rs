//! Processing Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("已有任务正在执行")]
    AlreadyRunning,

    #[error("无效的检测服务地址: {0}")]
    InvalidEndpoint(String),

    #[error("无效的步骤序号: {0}")]
    InvalidStep(usize),
}
