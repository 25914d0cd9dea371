//! Processing Events Port - 渲染层通知与缓存失效
//!
//! 控制器只通过这两个端口与外部协作者交互

use serde::{Deserialize, Serialize};

use crate::domain::processing::{CacheDomain, ProcessingSnapshot};

/// 通知级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// 面向用户的提示（toast）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Processing Events Port
///
/// 渲染层（UI）接收只读快照和提示
pub trait ProcessingEventsPort: Send + Sync {
    /// 状态变更后发布最新快照
    fn snapshot_changed(&self, snapshot: &ProcessingSnapshot);

    /// 发布用户提示
    fn notice(&self, notice: Notice);
}

/// Cache Invalidation Port
///
/// 任务成功完成时调用，每个任务恰好一次
pub trait CacheInvalidationPort: Send + Sync {
    fn invalidate(&self, domains: &[CacheDomain]);
}
