//! WebSocket Handler
//!
//! 渲染层通过全局事件流接收状态快照、缓存失效与提示

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;

use crate::application::ProcessingControllerPort;
use crate::domain::processing::CacheDomain;
use crate::infrastructure::events::{Delivery, WsEvent};
use crate::infrastructure::http::state::AppState;

/// 全局 WebSocket 连接处理
pub async fn global_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_global_socket(socket, state))
}

fn encode(event: &WsEvent) -> Option<Message> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Message::Text(json)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize event");
            None
        }
    }
}

/// 把订阅结果转换为要发送的事件，落后时用当前状态补齐
fn catch_up(delivery: Delivery, controller: &dyn ProcessingControllerPort) -> Vec<WsEvent> {
    match delivery {
        Delivery::Event(event) => vec![event],
        Delivery::SnapshotsLagged(skipped) => {
            tracing::debug!(
                skipped = skipped,
                "Global WebSocket lagged behind, resending snapshot"
            );
            vec![WsEvent::ProcessingUpdated {
                snapshot: controller.snapshot(),
            }]
        }
        Delivery::SignalsLagged(skipped) => {
            // 丢失的提示无法恢复；缓存失效按完成时的范围重发，客户端多刷新一次
            tracing::warn!(
                skipped = skipped,
                "Global WebSocket dropped signals, forcing cache refresh"
            );
            vec![
                WsEvent::ProcessingUpdated {
                    snapshot: controller.snapshot(),
                },
                WsEvent::cache_invalidated(&CacheDomain::ON_COMPLETION),
            ]
        }
    }
}

async fn handle_global_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // 先订阅再取快照，连接建立后不会漏掉状态变更
    let mut subscription = state.event_publisher.subscribe();
    let initial = WsEvent::ProcessingUpdated {
        snapshot: state.controller.snapshot(),
    };
    let controller = state.controller.clone();

    tracing::info!("Global WebSocket connected");

    // 事件转发任务
    let forward_task = tokio::spawn(async move {
        if let Some(msg) = encode(&initial) {
            if sender.send(msg).await.is_err() {
                return;
            }
        }

        while let Some(delivery) = subscription.next().await {
            for event in catch_up(delivery, controller.as_ref()) {
                let Some(msg) = encode(&event) else {
                    continue;
                };
                if let Err(e) = sender.send(msg).await {
                    tracing::debug!(error = %e, "Failed to send global WebSocket message");
                    return;
                }
            }
        }
    });

    // 接收客户端消息（心跳）
    let receive_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => {
                    tracing::info!("Global WebSocket closed by client");
                    break;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Global WebSocket error");
                    break;
                }
                // Ping 由 axum 自动响应 pong
                _ => {}
            }
        }
    });

    // 等待任一任务完成
    tokio::select! {
        _ = forward_task => {}
        _ = receive_task => {}
    }

    tracing::info!("Global WebSocket disconnected");
}
