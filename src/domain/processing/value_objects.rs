//! Processing Context - Value Objects

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::ProcessingError;

/// 任务唯一标识
///
/// 远程任务由检测服务分配，mock 任务在本地合成
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// 合成 mock 任务 ID：`mock_job_<unix-millis>`
    pub fn mock() -> Self {
        Self(format!("mock_job_{}", Utc::now().timestamp_millis()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 远程任务状态（检测服务上报）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Done,
    Error,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Done => "done",
            JobStatus::Error => "error",
        }
    }

    /// 解析服务端状态字符串
    ///
    /// 服务端在任务真正开始前会返回 `idle`，按 pending 处理
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "idle" | "pending" => Some(JobStatus::Pending),
            "running" => Some(JobStatus::Running),
            "done" => Some(JobStatus::Done),
            "error" => Some(JobStatus::Error),
            _ => None,
        }
    }
}

/// 步骤状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Running,
    Done,
    Error,
}

/// 控制器生命周期阶段
///
/// 状态机:
/// - `Idle --run--> Pending|Running`
/// - `Pending --poll(running)--> Running`
/// - `Running --全部完成--> Done`
/// - `Pending|Running --任务失败--> Error`
/// - 任意阶段 `--reset--> Idle`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingPhase {
    Idle,
    Pending,
    Running,
    Done,
    Error,
}

impl ProcessingPhase {
    pub fn is_active(&self) -> bool {
        matches!(self, ProcessingPhase::Pending | ProcessingPhase::Running)
    }
}

/// 执行模式
///
/// 每次 `run()` 时确定，任务生命周期内不变
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    Mock,
    Remote,
}

impl ExecutionMode {
    /// 根据端点配置选择模式
    pub fn select(endpoint: Option<&ApiBaseUrl>, force_mock: bool) -> Self {
        match endpoint {
            Some(_) if !force_mock => ExecutionMode::Remote,
            _ => ExecutionMode::Mock,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Mock => "mock",
            ExecutionMode::Remote => "remote",
        }
    }
}

/// 检测服务 Base URL
///
/// 去除首尾空白和末尾的 `/`，仅接受 http/https
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiBaseUrl(String);

impl ApiBaseUrl {
    /// 解析端点字符串
    ///
    /// 空白字符串表示未配置端点，返回 `Ok(None)`
    pub fn parse(raw: &str) -> Result<Option<Self>, ProcessingError> {
        let trimmed = raw.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Ok(None);
        }

        let rest = trimmed
            .strip_prefix("http://")
            .or_else(|| trimmed.strip_prefix("https://"))
            .ok_or_else(|| ProcessingError::InvalidEndpoint(raw.to_string()))?;
        if rest.is_empty() || rest.contains(char::is_whitespace) {
            return Err(ProcessingError::InvalidEndpoint(raw.to_string()));
        }

        Ok(Some(Self(trimmed.to_string())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 拼接 API 路径
    pub fn join(&self, path: &str) -> String {
        format!("{}{}", self.0, path)
    }
}

impl std::fmt::Display for ApiBaseUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 任务完成后需要刷新的查询缓存域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheDomain {
    /// 按项目的检测结果
    Detections,
    /// 项目列表
    Projects,
    /// 正射影像边界
    OrthoBounds,
}

impl CacheDomain {
    /// 任务完成时失效的全部缓存域
    pub const ON_COMPLETION: [CacheDomain; 3] = [
        CacheDomain::Detections,
        CacheDomain::Projects,
        CacheDomain::OrthoBounds,
    ];

    pub fn query_key(&self) -> &'static str {
        match self {
            CacheDomain::Detections => "detections",
            CacheDomain::Projects => "projects",
            CacheDomain::OrthoBounds => "ortho.bounds",
        }
    }
}
