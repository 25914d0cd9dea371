//! Application Ports - 端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod job_client;
mod processing_controller;
mod processing_events;

pub use job_client::{
    JobClientError, JobClientFactoryPort, JobClientPort, JobStatusReport, StartJobResponse,
    TaskOptions,
};
pub use processing_controller::{EndpointSettings, ProcessingControllerPort, RunOutcome};
pub use processing_events::{
    CacheInvalidationPort, Notice, NoticeLevel, ProcessingEventsPort,
};
