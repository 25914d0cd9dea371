//! Data Transfer Objects

use serde::{Deserialize, Serialize};

use crate::application::EndpointSettings;
use crate::domain::processing::ExecutionMode;

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

// ============================================================================
// Endpoint DTOs
// ============================================================================

/// 修改端点请求，省略的字段保持不变
#[derive(Debug, Default, Deserialize)]
pub struct ConfigureEndpointRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub force_mock: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct EndpointResponse {
    /// 未配置时为 null
    pub url: Option<String>,
    pub force_mock: bool,
    pub mode: ExecutionMode,
}

impl From<EndpointSettings> for EndpointResponse {
    fn from(settings: EndpointSettings) -> Self {
        Self {
            url: settings.url.map(|u| u.as_str().to_string()),
            force_mock: settings.force_mock,
            mode: settings.mode,
        }
    }
}
