//! Event Publisher Implementation
//!
//! WebSocket 事件推送实现：处理状态快照、缓存失效与用户提示

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::application::ports::{
    CacheInvalidationPort, Notice, NoticeLevel, ProcessingEventsPort,
};
use crate::domain::processing::{CacheDomain, ProcessingSnapshot};

/// WebSocket 事件类型
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum WsEvent {
    /// 处理状态变更
    ProcessingUpdated { snapshot: ProcessingSnapshot },
    /// 查询缓存失效，keys 为前端查询键
    CacheInvalidated {
        domains: Vec<CacheDomain>,
        keys: Vec<String>,
    },
    /// 用户提示
    Notice {
        level: NoticeLevel,
        title: String,
        message: String,
    },
}

impl WsEvent {
    pub fn cache_invalidated(domains: &[CacheDomain]) -> Self {
        WsEvent::CacheInvalidated {
            domains: domains.to_vec(),
            keys: domains.iter().map(|d| d.query_key().to_string()).collect(),
        }
    }
}

const SNAPSHOT_CAPACITY: usize = 100;
const SIGNAL_CAPACITY: usize = 64;

/// 事件发布器
///
/// 快照与信号（缓存失效、提示）分两个通道：快照可以用当前状态补齐，信号不行
pub struct EventPublisher {
    snapshot_channel: broadcast::Sender<WsEvent>,
    signal_channel: broadcast::Sender<WsEvent>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self::with_capacity(SNAPSHOT_CAPACITY, SIGNAL_CAPACITY)
    }

    pub fn with_capacity(snapshots: usize, signals: usize) -> Self {
        let (snapshot_tx, _) = broadcast::channel(snapshots);
        let (signal_tx, _) = broadcast::channel(signals);
        Self {
            snapshot_channel: snapshot_tx,
            signal_channel: signal_tx,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 订阅全部事件
    pub fn subscribe(&self) -> EventSubscription {
        EventSubscription {
            snapshots: self.snapshot_channel.subscribe(),
            signals: self.signal_channel.subscribe(),
        }
    }

    fn publish(channel: &broadcast::Sender<WsEvent>, event: WsEvent) {
        if let Err(e) = channel.send(event) {
            tracing::debug!(error = %e, "Failed to publish event (no receivers)");
        }
    }
}

/// [`EventSubscription::next`] 的结果
#[derive(Debug)]
pub enum Delivery {
    Event(WsEvent),
    /// 跳过了若干快照
    SnapshotsLagged(u64),
    /// 跳过了若干缓存失效或提示
    SignalsLagged(u64),
}

pub struct EventSubscription {
    snapshots: broadcast::Receiver<WsEvent>,
    signals: broadcast::Receiver<WsEvent>,
}

impl EventSubscription {
    /// 下一项事件，信号优先；发布器销毁后返回 `None`
    pub async fn next(&mut self) -> Option<Delivery> {
        let (result, from_signals) = tokio::select! {
            biased;
            r = self.signals.recv() => (r, true),
            r = self.snapshots.recv() => (r, false),
        };

        match result {
            Ok(event) => Some(Delivery::Event(event)),
            Err(RecvError::Lagged(skipped)) if from_signals => {
                Some(Delivery::SignalsLagged(skipped))
            }
            Err(RecvError::Lagged(skipped)) => Some(Delivery::SnapshotsLagged(skipped)),
            Err(RecvError::Closed) => None,
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingEventsPort for EventPublisher {
    fn snapshot_changed(&self, snapshot: &ProcessingSnapshot) {
        Self::publish(
            &self.snapshot_channel,
            WsEvent::ProcessingUpdated {
                snapshot: snapshot.clone(),
            },
        );
    }

    fn notice(&self, notice: Notice) {
        Self::publish(
            &self.signal_channel,
            WsEvent::Notice {
                level: notice.level,
                title: notice.title,
                message: notice.message,
            },
        );
    }
}

impl CacheInvalidationPort for EventPublisher {
    fn invalidate(&self, domains: &[CacheDomain]) {
        tracing::debug!(domains = ?domains, "Invalidating query caches");
        Self::publish(&self.signal_channel, WsEvent::cache_invalidated(domains));
    }
}
