//! 测试替身：记录调用的 ProcessingControllerPort 与检测服务客户端工厂

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::application::ports::{
    EndpointSettings, JobClientError, JobClientFactoryPort, JobClientPort, JobStatusReport,
    ProcessingControllerPort, RunOutcome, StartJobResponse, TaskOptions,
};
use crate::domain::processing::{
    ApiBaseUrl, ExecutionMode, JobId, ProcessingSnapshot, ProcessingState,
};

/// 固定返回 `outcome` 的控制器
pub struct FakeController {
    outcome: RunOutcome,
    url: Mutex<Option<ApiBaseUrl>>,
    force_mock: Mutex<bool>,
    last_options: Mutex<Option<TaskOptions>>,
    run_calls: AtomicUsize,
    reset_calls: AtomicUsize,
}

impl FakeController {
    pub fn new(outcome: RunOutcome) -> Self {
        Self {
            outcome,
            url: Mutex::new(None),
            force_mock: Mutex::new(false),
            last_options: Mutex::new(None),
            run_calls: AtomicUsize::new(0),
            reset_calls: AtomicUsize::new(0),
        }
    }

    pub fn run_calls(&self) -> usize {
        self.run_calls.load(Ordering::SeqCst)
    }

    pub fn reset_calls(&self) -> usize {
        self.reset_calls.load(Ordering::SeqCst)
    }

    pub fn last_options(&self) -> Option<TaskOptions> {
        self.last_options.lock().clone()
    }
}

impl ProcessingControllerPort for FakeController {
    fn run(&self, options: Option<TaskOptions>) -> RunOutcome {
        self.run_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_options.lock() = options;
        self.outcome.clone()
    }

    fn reset(&self) {
        self.reset_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn snapshot(&self) -> ProcessingSnapshot {
        ProcessingState::new().snapshot()
    }

    fn endpoint(&self) -> EndpointSettings {
        let url = self.url.lock().clone();
        let force_mock = *self.force_mock.lock();
        EndpointSettings {
            mode: ExecutionMode::select(url.as_ref(), force_mock),
            url,
            force_mock,
        }
    }

    fn set_endpoint(&self, url: Option<ApiBaseUrl>) {
        *self.url.lock() = url;
    }

    fn set_force_mock(&self, force_mock: bool) {
        *self.force_mock.lock() = force_mock;
    }
}

/// 只回答健康检查的客户端
struct HealthOnlyClient {
    healthy: bool,
}

#[async_trait]
impl JobClientPort for HealthOnlyClient {
    async fn start_job(&self, _options: &TaskOptions) -> Result<StartJobResponse, JobClientError> {
        Err(JobClientError::Rejected("not scripted".to_string()))
    }

    async fn get_job_status(&self, _job_id: &JobId) -> Result<JobStatusReport, JobClientError> {
        Err(JobClientError::Rejected("not scripted".to_string()))
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }
}

pub struct FakeJobClientFactory {
    healthy: AtomicBool,
    fail_connect: AtomicBool,
    connects: AtomicUsize,
}

impl FakeJobClientFactory {
    pub fn new(healthy: bool) -> Self {
        Self {
            healthy: AtomicBool::new(healthy),
            fail_connect: AtomicBool::new(false),
            connects: AtomicUsize::new(0),
        }
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub fn fail_connect(&self) {
        self.fail_connect.store(true, Ordering::SeqCst);
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl JobClientFactoryPort for FakeJobClientFactory {
    fn connect(&self, _base_url: &ApiBaseUrl) -> Result<Arc<dyn JobClientPort>, JobClientError> {
        if self.fail_connect.load(Ordering::SeqCst) {
            return Err(JobClientError::NetworkError("client build failed".to_string()));
        }
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(HealthOnlyClient {
            healthy: self.healthy.load(Ordering::SeqCst),
        }))
    }
}
