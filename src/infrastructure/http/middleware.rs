//! HTTP Middleware
//!
//! 请求日志：按路由模板记录耗时，业务错误（HTTP 200 + errno）与 4xx/5xx 分开记录

use axum::{
    extract::{MatchedPath, Request},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::time::Instant;

use super::error::RejectedRequest;

/// 一次请求的结果分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Ok,
    /// `ApiError` 返回的业务错误
    Rejected(i32),
    ClientError,
    ServerError,
}

pub fn classify(status: StatusCode, rejected: Option<&RejectedRequest>) -> RequestOutcome {
    if status.is_server_error() {
        RequestOutcome::ServerError
    } else if status.is_client_error() {
        RequestOutcome::ClientError
    } else if let Some(rejected) = rejected {
        RequestOutcome::Rejected(rejected.errno)
    } else {
        RequestOutcome::Ok
    }
}

/// 路由模板（如 `/api/processing/run`），未匹配时退回请求路径
pub fn route_label(request: &Request) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string())
}

pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let route = route_label(&request);
    let start = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let latency_ms = start.elapsed().as_millis() as u64;
    let rejected = response.extensions().get::<RejectedRequest>();

    match classify(status, rejected) {
        RequestOutcome::Ok => {
            tracing::debug!(method = %method, route = %route, latency_ms, "Request handled");
        }
        RequestOutcome::Rejected(errno) => {
            let error = rejected.map(|r| r.error.as_str()).unwrap_or_default();
            if errno >= 500 {
                tracing::error!(
                    method = %method,
                    route = %route,
                    errno,
                    error = %error,
                    latency_ms,
                    "Request failed"
                );
            } else {
                tracing::warn!(
                    method = %method,
                    route = %route,
                    errno,
                    error = %error,
                    latency_ms,
                    "Request rejected"
                );
            }
        }
        RequestOutcome::ClientError => {
            tracing::warn!(
                method = %method,
                route = %route,
                status = status.as_u16(),
                latency_ms,
                "HTTP client error"
            );
        }
        RequestOutcome::ServerError => {
            tracing::error!(
                method = %method,
                route = %route,
                status = status.as_u16(),
                latency_ms,
                "HTTP server error"
            );
        }
    }

    response
}
