//! Processing Handlers

use axum::{body::Bytes, extract::State, Json};
use std::sync::Arc;

use crate::application::{
    CheckDetectionHealth, ConfigureEndpointCommand, DetectionHealth, GetEndpoint,
    GetProcessingState, ResetProcessingCommand, RunProcessingCommand, RunProcessingResponse,
    TaskOptions,
};
use crate::domain::processing::ProcessingSnapshot;
use crate::infrastructure::http::dto::{ApiResponse, ConfigureEndpointRequest, EndpointResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 解析可选的 JSON 请求体，空请求体返回 `None`
fn parse_optional_json<T: serde::de::DeserializeOwned>(body: &Bytes) -> Result<Option<T>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))
}

// ============================================================================
// Run / Reset
// ============================================================================

pub async fn run_processing(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ApiResponse<RunProcessingResponse>>, ApiError> {
    let options: Option<TaskOptions> = parse_optional_json(&body)?;
    let result = state
        .run_processing_handler
        .handle(RunProcessingCommand { options })?;

    Ok(Json(ApiResponse::success(result)))
}

pub async fn reset_processing(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<ProcessingSnapshot>>, ApiError> {
    let snapshot = state
        .reset_processing_handler
        .handle(ResetProcessingCommand)?;

    Ok(Json(ApiResponse::success(snapshot)))
}

// ============================================================================
// State
// ============================================================================

pub async fn get_processing_state(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<ProcessingSnapshot>>, ApiError> {
    let snapshot = state
        .get_processing_state_handler
        .handle(GetProcessingState)?;

    Ok(Json(ApiResponse::success(snapshot)))
}

// ============================================================================
// Endpoint
// ============================================================================

pub async fn get_endpoint(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<EndpointResponse>>, ApiError> {
    let settings = state.get_endpoint_handler.handle(GetEndpoint)?;

    Ok(Json(ApiResponse::success(settings.into())))
}

pub async fn configure_endpoint(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ApiResponse<EndpointResponse>>, ApiError> {
    let req: ConfigureEndpointRequest = parse_optional_json(&body)?.unwrap_or_default();
    let settings = state
        .configure_endpoint_handler
        .handle(ConfigureEndpointCommand {
            url: req.url,
            force_mock: req.force_mock,
        })?;

    Ok(Json(ApiResponse::success(settings.into())))
}

pub async fn check_detection_health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<DetectionHealth>>, ApiError> {
    let health = state
        .check_detection_health_handler
        .handle(CheckDetectionHealth)
        .await?;

    Ok(Json(ApiResponse::success(health)))
}
