//! Processing Context - 处理任务限界上下文
//!
//! 职责:
//! - 任务生命周期状态机（idle → running → done | error）
//! - 五步展示流水线及其状态推导
//! - 执行模式与检测服务端点

mod aggregate;
mod entities;
mod errors;
mod value_objects;

pub use aggregate::{step_boundary, ProcessingSnapshot, ProcessingState, StatusUpdate, Transition};
pub use entities::{ProcessingStep, PIPELINE_STEPS};
pub use errors::ProcessingError;
pub use value_objects::{
    ApiBaseUrl, CacheDomain, ExecutionMode, JobId, JobStatus, ProcessingPhase, StepStatus,
};
