//! Processing Context - Aggregate Root

use serde::{Deserialize, Serialize};

use super::{
    ExecutionMode, JobId, JobStatus, ProcessingError, ProcessingPhase, ProcessingStep, StepStatus,
};

/// 一次状态轮询的结果（已转换为领域类型）
#[derive(Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    pub status: JobStatus,
    /// 0-100，超出范围会被截断
    pub progress: u8,
    pub current_step: String,
}

/// 一次状态变更的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// 任务仍在进行
    Progressed,
    /// 任务完成（每个任务只会出现一次）
    Completed,
    /// 任务失败
    Failed,
    /// 任务已结束或未开始，更新被忽略
    Ignored,
}

/// 渲染层消费的只读投影
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingSnapshot {
    pub is_running: bool,
    pub phase: ProcessingPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<ExecutionMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,
    pub progress: u8,
    pub elapsed_seconds: f64,
    pub current_step: String,
    pub steps: Vec<ProcessingStep>,
}

/// 由进度计算当前所处步骤：`floor(progress * n / 100)`
pub fn step_boundary(progress: u8, step_count: usize) -> usize {
    (progress.min(100) as usize * step_count) / 100
}

/// 处理任务聚合根
///
/// 不变量:
/// - done 步骤总是步骤列表的前缀
/// - 同一时刻至多一个 running 步骤
/// - 任务进行中 progress 单调不减，Done 时为 100
/// - 进入 Done/Error 后不再接受任何更新，耗时冻结
#[derive(Debug, Clone)]
pub struct ProcessingState {
    phase: ProcessingPhase,
    mode: Option<ExecutionMode>,
    job_id: Option<JobId>,
    progress: u8,
    elapsed_seconds: f64,
    current_step: String,
    steps: Vec<ProcessingStep>,
}

impl ProcessingState {
    pub fn new() -> Self {
        Self {
            phase: ProcessingPhase::Idle,
            mode: None,
            job_id: None,
            progress: 0,
            elapsed_seconds: 0.0,
            current_step: String::new(),
            steps: ProcessingStep::initial_pipeline(),
        }
    }

    /// 开始新任务
    ///
    /// 已有任务进行中时返回 `AlreadyRunning`；Done/Error 状态下会被新任务取代
    pub fn begin(&mut self, mode: ExecutionMode) -> Result<(), ProcessingError> {
        if self.phase.is_active() {
            return Err(ProcessingError::AlreadyRunning);
        }

        self.reset();
        self.mode = Some(mode);
        self.phase = match mode {
            ExecutionMode::Mock => ProcessingPhase::Running,
            ExecutionMode::Remote => ProcessingPhase::Pending,
        };
        Ok(())
    }

    /// 记录任务 ID
    pub fn attach_job(&mut self, job_id: JobId) {
        if self.phase.is_active() {
            self.job_id = Some(job_id);
        }
    }

    /// 更新任务耗时（只增不减，结束后冻结）
    pub fn advance_elapsed(&mut self, elapsed_seconds: f64) {
        if self.phase.is_active() && elapsed_seconds > self.elapsed_seconds {
            self.elapsed_seconds = elapsed_seconds;
        }
    }

    /// 应用一次远程轮询结果
    pub fn apply_status(&mut self, update: &StatusUpdate, now: f64) -> Transition {
        if !self.phase.is_active() {
            return Transition::Ignored;
        }

        self.progress = update.progress.min(100).max(self.progress);
        self.advance_elapsed(now);
        self.current_step = update.current_step.clone();

        match update.status {
            JobStatus::Done => {
                self.complete(now);
                Transition::Completed
            }
            JobStatus::Error => {
                self.mark_error_boundary(now);
                self.phase = ProcessingPhase::Error;
                Transition::Failed
            }
            JobStatus::Pending | JobStatus::Running => {
                let boundary = step_boundary(self.progress, self.steps.len());
                let running = update.status == JobStatus::Running;
                for (i, step) in self.steps.iter_mut().enumerate() {
                    if i < boundary {
                        step.mark_done(None, now);
                    } else if i == boundary && running {
                        step.mark_running(now);
                    } else {
                        step.mark_pending();
                    }
                }
                if running {
                    self.phase = ProcessingPhase::Running;
                }
                Transition::Progressed
            }
        }
    }

    /// mock 模式：步骤开始
    pub fn start_step(&mut self, index: usize, now: f64) -> Result<Transition, ProcessingError> {
        if index >= self.steps.len() {
            return Err(ProcessingError::InvalidStep(index));
        }
        if !self.phase.is_active() {
            return Ok(Transition::Ignored);
        }

        self.steps[index].mark_running(now);
        self.current_step = self.steps[index].name.clone();
        self.phase = ProcessingPhase::Running;
        Ok(Transition::Progressed)
    }

    /// mock 模式：步骤完成，记录该步骤耗时
    pub fn finish_step(
        &mut self,
        index: usize,
        step_elapsed: f64,
        now: f64,
    ) -> Result<Transition, ProcessingError> {
        let step_count = self.steps.len();
        if index >= step_count {
            return Err(ProcessingError::InvalidStep(index));
        }
        if !self.phase.is_active() {
            return Ok(Transition::Ignored);
        }

        self.steps[index].mark_done(Some(step_elapsed), now);
        let progress = ((index + 1) as f64 / step_count as f64 * 100.0).round() as u8;
        self.progress = progress.min(100).max(self.progress);
        self.advance_elapsed(now);

        if index + 1 == step_count {
            self.complete(now);
            return Ok(Transition::Completed);
        }
        Ok(Transition::Progressed)
    }

    /// 本地判定任务失败（轮询超限等）
    pub fn fail(&mut self, reason: impl Into<String>, now: f64) -> Transition {
        if !self.phase.is_active() {
            return Transition::Ignored;
        }

        self.advance_elapsed(now);
        self.current_step = reason.into();
        self.mark_error_boundary(now);
        self.phase = ProcessingPhase::Error;
        Transition::Failed
    }

    /// 恢复初始状态
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn snapshot(&self) -> ProcessingSnapshot {
        ProcessingSnapshot {
            is_running: self.is_running(),
            phase: self.phase,
            mode: self.mode,
            job_id: self.job_id.clone(),
            progress: self.progress,
            elapsed_seconds: self.elapsed_seconds,
            current_step: self.current_step.clone(),
            steps: self.steps.clone(),
        }
    }

    fn complete(&mut self, now: f64) {
        for step in self.steps.iter_mut() {
            step.mark_done(None, now);
        }
        self.progress = 100;
        self.phase = ProcessingPhase::Done;
    }

    fn mark_error_boundary(&mut self, now: f64) {
        let last = self.steps.len().saturating_sub(1);
        let boundary = step_boundary(self.progress, self.steps.len()).min(last);
        for (i, step) in self.steps.iter_mut().enumerate() {
            if i < boundary {
                step.mark_done(None, now);
            } else if i == boundary {
                step.mark_error();
            } else {
                step.mark_pending();
            }
        }
    }

    // Getters
    pub fn phase(&self) -> ProcessingPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase.is_active()
    }

    pub fn mode(&self) -> Option<ExecutionMode> {
        self.mode
    }

    pub fn job_id(&self) -> Option<&JobId> {
        self.job_id.as_ref()
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    pub fn current_step(&self) -> &str {
        &self.current_step
    }

    pub fn steps(&self) -> &[ProcessingStep] {
        &self.steps
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// 当前 running 步骤的序号
    pub fn running_step(&self) -> Option<usize> {
        self.steps
            .iter()
            .position(|s| s.status == StepStatus::Running)
    }
}

impl Default for ProcessingState {
    fn default() -> Self {
        Self::new()
    }
}
