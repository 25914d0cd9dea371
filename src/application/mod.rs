//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（JobClient、ProcessingEvents、ProcessingController）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports
pub use commands::{
    ConfigureEndpointCommand,
    ResetProcessingCommand,
    RunProcessingCommand,
    RunProcessingResponse,
    // Handlers
    handlers::{ConfigureEndpointHandler, ResetProcessingHandler, RunProcessingHandler},
};

pub use error::ApplicationError;

pub use ports::{
    // Processing controller
    EndpointSettings,
    ProcessingControllerPort,
    RunOutcome,
    // Job client
    JobClientError,
    JobClientFactoryPort,
    JobClientPort,
    JobStatusReport,
    StartJobResponse,
    TaskOptions,
    // Events
    CacheInvalidationPort,
    Notice,
    NoticeLevel,
    ProcessingEventsPort,
};

pub use queries::{
    CheckDetectionHealth,
    DetectionHealth,
    GetEndpoint,
    GetProcessingState,
    // Handlers
    handlers::{CheckDetectionHealthHandler, GetEndpointHandler, GetProcessingStateHandler},
};
