//! 测试替身：脚本化的检测服务客户端与记录型事件端口

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{
    CacheInvalidationPort, JobClientError, JobClientFactoryPort, JobClientPort, JobStatusReport,
    Notice, ProcessingEventsPort, StartJobResponse, TaskOptions,
};
use crate::domain::processing::{ApiBaseUrl, CacheDomain, JobId, JobStatus, ProcessingSnapshot};

pub fn started(job_id: &str) -> StartJobResponse {
    StartJobResponse {
        job_id: JobId::new(job_id),
        status: "started".to_string(),
        message: "Processing started".to_string(),
    }
}

pub fn report(job_id: &str, status: JobStatus, progress: u8) -> JobStatusReport {
    JobStatusReport {
        job_id: JobId::new(job_id),
        status,
        progress,
        current_step: format!("step at {}%", progress),
        elapsed_seconds: 0.0,
    }
}

/// 按脚本返回结果的客户端
///
/// 状态脚本耗尽后，若设置了 `repeat_status` 则重复返回该结果，否则返回网络错误
pub struct ScriptedJobClient {
    start: Mutex<VecDeque<Result<StartJobResponse, JobClientError>>>,
    statuses: Mutex<VecDeque<Result<JobStatusReport, JobClientError>>>,
    repeat: Mutex<Option<JobStatusReport>>,
    status_delay: Mutex<Option<Duration>>,
    last_options: Mutex<Option<TaskOptions>>,
    status_calls: AtomicUsize,
}

impl ScriptedJobClient {
    pub fn new() -> Self {
        Self {
            start: Mutex::new(VecDeque::new()),
            statuses: Mutex::new(VecDeque::new()),
            repeat: Mutex::new(None),
            status_delay: Mutex::new(None),
            last_options: Mutex::new(None),
            status_calls: AtomicUsize::new(0),
        }
    }

    pub fn script_start(&self, result: Result<StartJobResponse, JobClientError>) {
        self.start.lock().push_back(result);
    }

    pub fn script_status(&self, result: Result<JobStatusReport, JobClientError>) {
        self.statuses.lock().push_back(result);
    }

    pub fn repeat_status(&self, report: JobStatusReport) {
        *self.repeat.lock() = Some(report);
    }

    pub fn set_status_delay(&self, delay: Duration) {
        *self.status_delay.lock() = Some(delay);
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn last_options(&self) -> Option<TaskOptions> {
        self.last_options.lock().clone()
    }
}

#[async_trait]
impl JobClientPort for ScriptedJobClient {
    async fn start_job(&self, options: &TaskOptions) -> Result<StartJobResponse, JobClientError> {
        *self.last_options.lock() = Some(options.clone());
        self.start
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(JobClientError::NetworkError("no scripted start".to_string())))
    }

    async fn get_job_status(&self, _job_id: &JobId) -> Result<JobStatusReport, JobClientError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.status_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.statuses.lock().pop_front();
        match next {
            Some(result) => result,
            None => match self.repeat.lock().clone() {
                Some(report) => Ok(report),
                None => Err(JobClientError::NetworkError("no scripted status".to_string())),
            },
        }
    }

    async fn health_check(&self) -> bool {
        true
    }
}

pub struct ScriptedClientFactory {
    client: Arc<ScriptedJobClient>,
    connects: AtomicUsize,
    fail_next: AtomicBool,
}

impl ScriptedClientFactory {
    pub fn new(client: Arc<ScriptedJobClient>) -> Self {
        Self {
            client,
            connects: AtomicUsize::new(0),
            fail_next: AtomicBool::new(false),
        }
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn fail_next_connect(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

impl JobClientFactoryPort for ScriptedClientFactory {
    fn connect(&self, _base_url: &ApiBaseUrl) -> Result<Arc<dyn JobClientPort>, JobClientError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(JobClientError::NetworkError("client build failed".to_string()));
        }
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(self.client.clone())
    }
}

#[derive(Default)]
pub struct RecordingEvents {
    snapshots: Mutex<Vec<ProcessingSnapshot>>,
    notices: Mutex<Vec<Notice>>,
}

impl RecordingEvents {
    pub fn snapshots(&self) -> Vec<ProcessingSnapshot> {
        self.snapshots.lock().clone()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }
}

impl ProcessingEventsPort for RecordingEvents {
    fn snapshot_changed(&self, snapshot: &ProcessingSnapshot) {
        self.snapshots.lock().push(snapshot.clone());
    }

    fn notice(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}

#[derive(Default)]
pub struct RecordingCache {
    calls: Mutex<Vec<Vec<CacheDomain>>>,
}

impl RecordingCache {
    pub fn count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn last(&self) -> Option<Vec<CacheDomain>> {
        self.calls.lock().last().cloned()
    }
}

impl CacheInvalidationPort for RecordingCache {
    fn invalidate(&self, domains: &[CacheDomain]) {
        self.calls.lock().push(domains.to_vec());
    }
}
