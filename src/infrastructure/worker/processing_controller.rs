//! Processing Controller - 任务生命周期控制器
//!
//! 状态的唯一写入者。每次 `run()`/`reset()` 都会递增 generation，
//! 策略持有的 [`JobHandle`] 在 generation 不匹配时失效，迟到的响应被丢弃。

use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::job_strategy::JobStrategy;
use super::mock_job_strategy::MockJobStrategy;
use super::remote_job_strategy::{RemoteJobStrategy, RemotePollConfig};
use crate::application::ports::{
    CacheInvalidationPort, EndpointSettings, JobClientFactoryPort, Notice, ProcessingControllerPort,
    ProcessingEventsPort, RunOutcome, TaskOptions,
};
use crate::domain::processing::{
    ApiBaseUrl, CacheDomain, ExecutionMode, JobId, ProcessingSnapshot, ProcessingState,
    StatusUpdate, Transition,
};

/// 控制器配置
#[derive(Debug, Clone)]
pub struct ProcessingControllerConfig {
    /// 检测服务端点，`None` 时使用 mock 模式
    pub endpoint: Option<ApiBaseUrl>,
    pub force_mock: bool,
    /// 远程模式轮询间隔
    pub poll_interval: Duration,
    /// mock 模式各步骤耗时
    pub mock_step_durations: Vec<Duration>,
    /// 连续轮询失败上限，0 表示不限
    pub max_consecutive_poll_failures: u32,
    /// 轮询总时长上限
    pub max_poll_duration: Option<Duration>,
    /// `run()` 未指定选项时使用
    pub default_options: TaskOptions,
}

impl Default for ProcessingControllerConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            force_mock: false,
            poll_interval: Duration::from_millis(1000),
            mock_step_durations: [700, 400, 500, 600, 500]
                .into_iter()
                .map(Duration::from_millis)
                .collect(),
            max_consecutive_poll_failures: 30,
            max_poll_duration: Some(Duration::from_secs(1800)),
            default_options: TaskOptions::default(),
        }
    }
}

#[derive(Debug, Clone)]
struct EndpointState {
    url: Option<ApiBaseUrl>,
    force_mock: bool,
}

/// generation 与状态放在同一把锁下，校验和修改是原子的
struct Slot {
    generation: u64,
    started_at: Option<Instant>,
    state: ProcessingState,
    worker: Option<JoinHandle<()>>,
}

impl Slot {
    fn now(&self) -> f64 {
        self.started_at
            .map(|s| s.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

struct ControllerShared {
    slot: Mutex<Slot>,
    /// 在持锁期间调用，实现不能阻塞
    events: Arc<dyn ProcessingEventsPort>,
    cache: Arc<dyn CacheInvalidationPort>,
}

impl ControllerShared {
    /// 使当前任务失效并回到初始状态，调用方需持有 slot 锁
    fn clear(&self, slot: &mut Slot) {
        slot.generation += 1;
        if let Some(worker) = slot.worker.take() {
            worker.abort();
        }
        slot.started_at = None;
        slot.state.reset();
        self.events.snapshot_changed(&slot.state.snapshot());
    }
}

/// 策略修改状态的唯一入口
///
/// 绑定创建时的 generation；`reset()` 或新任务开始后所有操作都会被忽略
#[derive(Clone)]
pub struct JobHandle {
    shared: Arc<ControllerShared>,
    generation: u64,
}

impl JobHandle {
    pub fn is_current(&self) -> bool {
        self.shared.slot.lock().generation == self.generation
    }

    /// 自 `run()` 起的本地耗时
    pub fn elapsed(&self) -> Duration {
        let slot = self.shared.slot.lock();
        match slot.started_at {
            Some(started) if slot.generation == self.generation => started.elapsed(),
            _ => Duration::ZERO,
        }
    }

    /// 记录任务 ID，handle 失效时返回 false
    pub fn attach_job(&self, job_id: JobId) -> bool {
        self.update(|state, _| {
            state.attach_job(job_id);
            Transition::Progressed
        })
        .is_some()
    }

    pub fn apply_status(&self, update: &StatusUpdate) -> Option<Transition> {
        self.update(|state, now| state.apply_status(update, now))
    }

    pub fn start_step(&self, index: usize) -> Option<Transition> {
        self.update(|state, now| match state.start_step(index, now) {
            Ok(t) => t,
            Err(e) => state.fail(e.to_string(), now),
        })
    }

    pub fn finish_step(&self, index: usize, step_elapsed: Duration) -> Option<Transition> {
        self.update(|state, now| {
            match state.finish_step(index, step_elapsed.as_secs_f64(), now) {
                Ok(t) => t,
                Err(e) => state.fail(e.to_string(), now),
            }
        })
    }

    /// 本地判定任务失败
    pub fn fail(&self, reason: impl Into<String>) -> Option<Transition> {
        let reason = reason.into();
        self.update(|state, now| state.fail(reason, now))
    }

    /// 启动请求失败：回到 idle，不进入 error
    pub fn abort_start(&self, reason: &str) {
        {
            let mut slot = self.shared.slot.lock();
            if slot.generation != self.generation {
                tracing::debug!(generation = self.generation, "Stale start failure dropped");
                return;
            }
            slot.started_at = None;
            slot.state.reset();
            self.shared.events.snapshot_changed(&slot.state.snapshot());
        }
        self.shared
            .events
            .notice(Notice::error("Processing failed", reason));
    }

    /// 发布提示（handle 失效时不发布）
    pub fn notice(&self, notice: Notice) {
        if self.is_current() {
            self.shared.events.notice(notice);
        }
    }

    fn update<F>(&self, f: F) -> Option<Transition>
    where
        F: FnOnce(&mut ProcessingState, f64) -> Transition,
    {
        let (transition, reason) = {
            let mut slot = self.shared.slot.lock();
            if slot.generation != self.generation {
                tracing::debug!(
                    generation = self.generation,
                    current = slot.generation,
                    "Stale job update dropped"
                );
                return None;
            }
            let now = slot.now();
            let transition = f(&mut slot.state, now);
            if transition != Transition::Ignored {
                self.shared.events.snapshot_changed(&slot.state.snapshot());
            }
            (transition, slot.state.current_step().to_string())
        };

        match transition {
            Transition::Completed => {
                self.shared.cache.invalidate(&CacheDomain::ON_COMPLETION);
                self.shared
                    .events
                    .notice(Notice::success("Processing complete", "Detection results updated"));
            }
            Transition::Failed => {
                self.shared
                    .events
                    .notice(Notice::error("Processing failed", reason));
            }
            Transition::Progressed | Transition::Ignored => {}
        }
        Some(transition)
    }
}

/// 处理任务控制器
pub struct ProcessingController {
    poll: RemotePollConfig,
    mock_step_durations: Vec<Duration>,
    default_options: TaskOptions,
    endpoint: RwLock<EndpointState>,
    client_factory: Arc<dyn JobClientFactoryPort>,
    shared: Arc<ControllerShared>,
}

impl ProcessingController {
    pub fn new(
        config: ProcessingControllerConfig,
        client_factory: Arc<dyn JobClientFactoryPort>,
        events: Arc<dyn ProcessingEventsPort>,
        cache: Arc<dyn CacheInvalidationPort>,
    ) -> Self {
        Self {
            poll: RemotePollConfig {
                poll_interval: config.poll_interval,
                max_consecutive_failures: config.max_consecutive_poll_failures,
                max_duration: config.max_poll_duration,
            },
            mock_step_durations: config.mock_step_durations,
            default_options: config.default_options,
            endpoint: RwLock::new(EndpointState {
                url: config.endpoint,
                force_mock: config.force_mock,
            }),
            client_factory,
            shared: Arc::new(ControllerShared {
                slot: Mutex::new(Slot {
                    generation: 0,
                    started_at: None,
                    state: ProcessingState::new(),
                    worker: None,
                }),
                events,
                cache,
            }),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 构造本次任务的执行策略
    fn build_strategy(
        &self,
        endpoint: &EndpointState,
        options: TaskOptions,
    ) -> Result<Box<dyn JobStrategy>, String> {
        match (&endpoint.url, endpoint.force_mock) {
            (Some(url), false) => {
                let client = self
                    .client_factory
                    .connect(url)
                    .map_err(|e| e.to_string())?;
                Ok(Box::new(RemoteJobStrategy::new(
                    client,
                    options,
                    self.poll.clone(),
                )))
            }
            _ => Ok(Box::new(MockJobStrategy::new(
                self.mock_step_durations.clone(),
            ))),
        }
    }
}

impl ProcessingControllerPort for ProcessingController {
    fn run(&self, options: Option<TaskOptions>) -> RunOutcome {
        if self.shared.slot.lock().state.is_running() {
            tracing::debug!("Run ignored: job already in flight");
            return RunOutcome::AlreadyRunning;
        }

        // 模式在此刻确定，之后修改端点不影响本次任务
        let endpoint = self.endpoint.read().clone();
        let options = options.unwrap_or_else(|| self.default_options.clone());
        let strategy = match self.build_strategy(&endpoint, options) {
            Ok(strategy) => strategy,
            Err(reason) => {
                tracing::error!(error = %reason, "Failed to prepare job client");
                {
                    let mut slot = self.shared.slot.lock();
                    if slot.state.is_running() {
                        return RunOutcome::AlreadyRunning;
                    }
                    // 上一个任务的终态快照不能保留
                    self.shared.clear(&mut slot);
                }
                self.shared
                    .events
                    .notice(Notice::error("Processing failed", reason.clone()));
                return RunOutcome::StartFailed { reason };
            }
        };
        let mode = strategy.mode();

        let mut slot = self.shared.slot.lock();
        if slot.state.begin(mode).is_err() {
            tracing::debug!("Run ignored: job already in flight");
            return RunOutcome::AlreadyRunning;
        }
        slot.generation += 1;
        slot.started_at = Some(Instant::now());
        if let Some(previous) = slot.worker.take() {
            previous.abort();
        }
        self.shared.events.snapshot_changed(&slot.state.snapshot());

        let generation = slot.generation;
        let handle = JobHandle {
            shared: self.shared.clone(),
            generation,
        };
        slot.worker = Some(tokio::spawn(async move {
            strategy.execute(handle).await;
        }));

        tracing::info!(
            mode = mode.as_str(),
            generation = generation,
            endpoint = ?endpoint.url.as_ref().map(|u| u.as_str()),
            "Processing job started"
        );
        RunOutcome::Started { mode, generation }
    }

    fn reset(&self) {
        let mut slot = self.shared.slot.lock();
        self.shared.clear(&mut slot);

        tracing::info!(generation = slot.generation, "Processing state reset");
    }

    fn snapshot(&self) -> ProcessingSnapshot {
        self.shared.slot.lock().state.snapshot()
    }

    fn endpoint(&self) -> EndpointSettings {
        let endpoint = self.endpoint.read();
        EndpointSettings {
            url: endpoint.url.clone(),
            force_mock: endpoint.force_mock,
            mode: ExecutionMode::select(endpoint.url.as_ref(), endpoint.force_mock),
        }
    }

    fn set_endpoint(&self, url: Option<ApiBaseUrl>) {
        tracing::info!(
            endpoint = ?url.as_ref().map(|u| u.as_str()),
            "Detection endpoint changed"
        );
        self.endpoint.write().url = url;
    }

    fn set_force_mock(&self, force_mock: bool) {
        tracing::info!(force_mock = force_mock, "Force mock mode changed");
        self.endpoint.write().force_mock = force_mock;
    }
}

impl Drop for ProcessingController {
    fn drop(&mut self) {
        if let Some(worker) = self.shared.slot.lock().worker.take() {
            worker.abort();
        }
    }
}
