//! Remote Job Strategy - 远程检测任务
//!
//! 发送启动请求后按固定间隔轮询任务状态，直到任务结束、handle 失效或触发轮询上限

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::job_strategy::JobStrategy;
use super::JobHandle;
use crate::application::ports::{JobClientPort, Notice, TaskOptions};
use crate::domain::processing::{ExecutionMode, Transition};

/// 轮询间隔下限，`interval_at` 不接受零间隔
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// 轮询配置
#[derive(Debug, Clone)]
pub struct RemotePollConfig {
    pub poll_interval: Duration,
    /// 连续失败上限，0 表示不限
    pub max_consecutive_failures: u32,
    pub max_duration: Option<Duration>,
}

/// 远程任务策略
pub struct RemoteJobStrategy {
    client: Arc<dyn JobClientPort>,
    options: TaskOptions,
    poll: RemotePollConfig,
}

impl RemoteJobStrategy {
    pub fn new(client: Arc<dyn JobClientPort>, options: TaskOptions, poll: RemotePollConfig) -> Self {
        Self {
            client,
            options,
            poll,
        }
    }
}

#[async_trait]
impl JobStrategy for RemoteJobStrategy {
    fn mode(&self) -> ExecutionMode {
        ExecutionMode::Remote
    }

    async fn execute(&self, job: JobHandle) {
        tracing::debug!(
            project_id = %self.options.project_id,
            classes = ?self.options.detection_classes(),
            "Sending start job request"
        );

        let started = match self.client.start_job(&self.options).await {
            Ok(started) => started,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to start remote job");
                job.abort_start(&e.to_string());
                return;
            }
        };

        let job_id = started.job_id;
        if !job.attach_job(job_id.clone()) {
            tracing::debug!(job_id = %job_id, "Job superseded before polling started");
            return;
        }
        tracing::info!(
            job_id = %job_id,
            status = %started.status,
            message = %started.message,
            "Remote job started"
        );
        job.notice(Notice::info("Processing started", format!("Job ID: {}", job_id)));

        let period = self.poll.poll_interval.max(MIN_POLL_INTERVAL);
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut failures: u32 = 0;

        loop {
            ticker.tick().await;
            if !job.is_current() {
                return;
            }

            match self.client.get_job_status(&job_id).await {
                Ok(report) => {
                    failures = 0;
                    tracing::debug!(
                        job_id = %job_id,
                        status = report.status.as_str(),
                        progress = report.progress,
                        current_step = %report.current_step,
                        server_elapsed = report.elapsed_seconds,
                        "Job status polled"
                    );

                    match job.apply_status(&report.to_update()) {
                        Some(Transition::Progressed) => {}
                        Some(Transition::Completed) => {
                            tracing::info!(job_id = %job_id, "Remote job completed");
                            return;
                        }
                        Some(Transition::Failed) => {
                            tracing::warn!(
                                job_id = %job_id,
                                reason = %report.current_step,
                                "Remote job failed"
                            );
                            return;
                        }
                        Some(Transition::Ignored) | None => return,
                    }
                }
                Err(e) => {
                    failures += 1;
                    tracing::warn!(
                        job_id = %job_id,
                        error = %e,
                        consecutive_failures = failures,
                        "Job status poll failed"
                    );

                    let limit = self.poll.max_consecutive_failures;
                    if limit > 0 && failures >= limit {
                        job.fail(format!(
                            "Status polling failed {} times in a row: {}",
                            failures, e
                        ));
                        return;
                    }
                }
            }

            if let Some(max) = self.poll.max_duration {
                if job.elapsed() >= max {
                    tracing::warn!(job_id = %job_id, max_secs = max.as_secs(), "Job polling timed out");
                    job.fail(format!("Job did not finish within {}s", max.as_secs()));
                    return;
                }
            }
        }
    }
}
