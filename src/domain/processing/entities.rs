//! Processing Context - Entities

use serde::{Deserialize, Serialize};

use super::StepStatus;

/// 流水线步骤名称（顺序固定）
pub const PIPELINE_STEPS: [&str; 5] = [
    "Semantic segmentation",
    "Object extraction",
    "Terrain / DSM sampling",
    "Object detection",
    "Height / volume analysis",
];

/// 流水线中的一个展示步骤
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingStep {
    /// 从 1 开始的序号
    pub id: u32,
    pub name: String,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_seconds: Option<f64>,
    /// 本步骤首次进入 running 时的任务耗时（秒）
    #[serde(skip)]
    started_at: Option<f64>,
}

impl ProcessingStep {
    fn new(id: u32, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            status: StepStatus::Pending,
            elapsed_seconds: None,
            started_at: None,
        }
    }

    /// 初始流水线：全部 pending，无耗时
    pub fn initial_pipeline() -> Vec<ProcessingStep> {
        PIPELINE_STEPS
            .iter()
            .enumerate()
            .map(|(i, name)| ProcessingStep::new(i as u32 + 1, name))
            .collect()
    }

    pub(super) fn mark_running(&mut self, now: f64) {
        if self.status != StepStatus::Running {
            self.started_at = Some(now);
        }
        self.status = StepStatus::Running;
    }

    /// 标记完成；未显式给出耗时时按进入 running 的时间推算
    pub(super) fn mark_done(&mut self, elapsed: Option<f64>, now: f64) {
        if self.status == StepStatus::Done {
            return;
        }
        self.elapsed_seconds = elapsed.or_else(|| self.started_at.map(|s| (now - s).max(0.0)));
        self.status = StepStatus::Done;
    }

    pub(super) fn mark_pending(&mut self) {
        self.status = StepStatus::Pending;
        self.elapsed_seconds = None;
        self.started_at = None;
    }

    pub(super) fn mark_error(&mut self) {
        self.status = StepStatus::Error;
    }
}
