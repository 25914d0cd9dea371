//! Mock Job Strategy - 本地模拟任务
//!
//! 未配置检测服务时使用：按固定耗时依次推进每个步骤，无网络依赖

use async_trait::async_trait;
use std::time::Duration;

use super::job_strategy::JobStrategy;
use super::JobHandle;
use crate::domain::processing::{ExecutionMode, JobId, Transition};

/// Mock 任务策略
pub struct MockJobStrategy {
    step_durations: Vec<Duration>,
}

impl MockJobStrategy {
    pub fn new(step_durations: Vec<Duration>) -> Self {
        Self { step_durations }
    }

    /// 整个模拟序列的总时长
    pub fn total_duration(&self) -> Duration {
        self.step_durations.iter().sum()
    }
}

#[async_trait]
impl JobStrategy for MockJobStrategy {
    fn mode(&self) -> ExecutionMode {
        ExecutionMode::Mock
    }

    async fn execute(&self, job: JobHandle) {
        let job_id = JobId::mock();
        if !job.attach_job(job_id.clone()) {
            return;
        }

        tracing::info!(
            job_id = %job_id,
            steps = self.step_durations.len(),
            total_ms = self.total_duration().as_millis() as u64,
            "Mock job started"
        );

        for (index, duration) in self.step_durations.iter().enumerate() {
            if job.start_step(index) != Some(Transition::Progressed) {
                return;
            }

            tokio::time::sleep(*duration).await;

            match job.finish_step(index, *duration) {
                Some(Transition::Progressed) => {}
                Some(Transition::Completed) => {
                    tracing::info!(job_id = %job_id, "Mock job completed");
                    return;
                }
                _ => return,
            }
        }

        // 步骤耗时少于流水线步骤数
        job.fail("Mock sequence ended before the last step");
    }
}
