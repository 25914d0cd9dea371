//! Worker Layer - Background Job Processing
//!
//! 实现 ProcessingController 及 mock / remote 两种任务执行策略

mod job_strategy;
mod mock_job_strategy;
mod processing_controller;
mod remote_job_strategy;

#[cfg(test)]
pub(crate) mod testing;

pub use job_strategy::JobStrategy;
pub use mock_job_strategy::MockJobStrategy;
pub use processing_controller::{JobHandle, ProcessingController, ProcessingControllerConfig};
pub use remote_job_strategy::{RemoteJobStrategy, RemotePollConfig};
