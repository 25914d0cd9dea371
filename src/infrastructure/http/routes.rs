//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                  GET   健康检查
//! - /api/processing/run        POST  开始处理任务（可选 TaskOptions）
//! - /api/processing/reset      POST  取消任务并恢复初始状态
//! - /api/processing/state      GET   当前状态快照
//! - /api/processing/endpoint   GET   当前检测服务端点
//! - /api/processing/endpoint   POST  修改检测服务端点 / 强制 mock
//! - /api/processing/health     GET   检测服务连通性
//! - /ws/events                 WS    全局 WebSocket（状态快照、缓存失效、提示）

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .route("/ws/events", get(handlers::global_websocket_handler))
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/processing", processing_routes())
}

/// Processing 路由
fn processing_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/run", post(handlers::run_processing))
        .route("/reset", post(handlers::reset_processing))
        .route("/state", get(handlers::get_processing_state))
        .route(
            "/endpoint",
            get(handlers::get_endpoint).post(handlers::configure_endpoint),
        )
        .route("/health", get(handlers::check_detection_health))
}
