//! HTTP Job Client - 调用外部检测服务
//!
//! 实现 JobClientPort trait，通过 HTTP 调用检测服务的任务接口
//!
//! 外部检测 API:
//! POST {base}/api/process                 Request: TaskOptions (JSON)
//!                                          Response: {"job_id", "status", "message"} 或 {"error"}
//! GET  {base}/api/process/{job_id}/status  Response: {"job_id", "status", "progress",
//!                                                     "current_step", "elapsed_seconds"}

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{
    JobClientError, JobClientFactoryPort, JobClientPort, JobStatusReport, StartJobResponse,
    TaskOptions,
};
use crate::domain::processing::{ApiBaseUrl, JobId, JobStatus};

/// 启动任务响应体
#[derive(Debug, Deserialize)]
struct StartJobBody {
    #[serde(default)]
    job_id: Option<String>,
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    error: Option<String>,
}

/// 任务状态响应体
#[derive(Debug, Deserialize)]
struct JobStatusBody {
    #[serde(default)]
    job_id: Option<String>,
    status: String,
    #[serde(default)]
    progress: f64,
    #[serde(default)]
    current_step: String,
    #[serde(default)]
    elapsed_seconds: f64,
}

/// HTTP Job 客户端配置
#[derive(Debug, Clone)]
pub struct HttpJobClientConfig {
    /// 检测服务基础 URL
    pub base_url: ApiBaseUrl,
    /// 单次请求超时时间（秒）
    pub timeout_secs: u64,
}

impl HttpJobClientConfig {
    pub fn new(base_url: ApiBaseUrl) -> Self {
        Self {
            base_url,
            timeout_secs: 30,
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP Job 客户端
pub struct HttpJobClient {
    client: Client,
    config: HttpJobClientConfig,
}

impl HttpJobClient {
    /// 创建新的 HTTP Job 客户端
    pub fn new(config: HttpJobClientConfig) -> Result<Self, JobClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| JobClientError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn start_url(&self) -> String {
        self.config.base_url.join("/api/process")
    }

    /// job_id 作为单个路径段编码，`#`、`?`、`/` 不会改变请求的资源
    fn status_url(&self, job_id: &JobId) -> Result<Url, JobClientError> {
        let mut url = Url::parse(&self.start_url())
            .map_err(|e| JobClientError::NetworkError(format!("Invalid status URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| JobClientError::NetworkError("Base URL cannot hold a path".to_string()))?
            .push(job_id.as_str())
            .push("status");
        Ok(url)
    }

    fn health_url(&self) -> String {
        self.config.base_url.join("/")
    }

    /// 非 2xx 状态码转换为 ServiceError
    async fn check_status(response: Response) -> Result<Response, JobClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let error_text = response.text().await.unwrap_or_default();
        Err(JobClientError::ServiceError(format!(
            "HTTP {}: {}",
            status, error_text
        )))
    }
}

fn map_send_error(e: reqwest::Error) -> JobClientError {
    if e.is_timeout() {
        JobClientError::Timeout
    } else if e.is_connect() {
        JobClientError::NetworkError(format!("Cannot connect to detection service: {}", e))
    } else {
        JobClientError::NetworkError(e.to_string())
    }
}

#[async_trait]
impl JobClientPort for HttpJobClient {
    async fn start_job(&self, options: &TaskOptions) -> Result<StartJobResponse, JobClientError> {
        tracing::debug!(url = %self.start_url(), project_id = %options.project_id, "Sending start job request");

        let response = self
            .client
            .post(self.start_url())
            .json(options)
            .send()
            .await
            .map_err(map_send_error)?;
        let response = Self::check_status(response).await?;

        let body: StartJobBody = response
            .json()
            .await
            .map_err(|e| JobClientError::InvalidResponse(format!("Failed to decode start response: {}", e)))?;

        if let Some(error) = body.error {
            return Err(JobClientError::Rejected(error));
        }
        let job_id = body
            .job_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| JobClientError::InvalidResponse("Missing job_id".to_string()))?;

        Ok(StartJobResponse {
            job_id: JobId::new(job_id),
            status: body.status,
            message: body.message,
        })
    }

    async fn get_job_status(&self, job_id: &JobId) -> Result<JobStatusReport, JobClientError> {
        let response = self
            .client
            .get(self.status_url(job_id)?)
            .send()
            .await
            .map_err(map_send_error)?;
        let response = Self::check_status(response).await?;

        let body: JobStatusBody = response
            .json()
            .await
            .map_err(|e| JobClientError::InvalidResponse(format!("Failed to decode status: {}", e)))?;

        let status = JobStatus::parse(&body.status).ok_or_else(|| {
            JobClientError::InvalidResponse(format!("Unknown job status: {}", body.status))
        })?;

        Ok(JobStatusReport {
            job_id: body.job_id.map(JobId::new).unwrap_or_else(|| job_id.clone()),
            status,
            progress: body.progress.clamp(0.0, 100.0).floor() as u8,
            current_step: body.current_step,
            elapsed_seconds: body.elapsed_seconds.max(0.0),
        })
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(self.health_url())
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

/// 按端点创建 HttpJobClient
pub struct HttpJobClientFactory {
    timeout_secs: u64,
}

impl HttpJobClientFactory {
    pub fn new(timeout_secs: u64) -> Self {
        Self { timeout_secs }
    }
}

impl JobClientFactoryPort for HttpJobClientFactory {
    fn connect(&self, base_url: &ApiBaseUrl) -> Result<Arc<dyn JobClientPort>, JobClientError> {
        let config = HttpJobClientConfig::new(base_url.clone()).with_timeout(self.timeout_secs);
        Ok(Arc::new(HttpJobClient::new(config)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::Path,
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    /// 在本地端口启动一个假的检测服务
    async fn serve(router: Router) -> ApiBaseUrl {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        ApiBaseUrl::parse(&format!("http://{}", addr)).unwrap().unwrap()
    }

    fn client(base_url: ApiBaseUrl) -> HttpJobClient {
        HttpJobClient::new(HttpJobClientConfig::new(base_url).with_timeout(5)).unwrap()
    }

    #[test]
    fn test_config_builder() {
        let url = ApiBaseUrl::parse("http://example.com:7860").unwrap().unwrap();
        let config = HttpJobClientConfig::new(url).with_timeout(10);
        assert_eq!(config.base_url.as_str(), "http://example.com:7860");
        assert_eq!(config.timeout_secs, 10);
    }

    #[tokio::test]
    async fn test_start_job_sends_options() {
        let router = Router::new().route(
            "/api/process",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["project_id"], "site-7");
                assert_eq!(body["detect_cone"], true);
                Json(json!({"job_id": "job_1700000000", "status": "started", "message": "Processing started"}))
            }),
        );
        let client = client(serve(router).await);

        let options = TaskOptions {
            project_id: "site-7".to_string(),
            detect_cone: true,
            ..Default::default()
        };
        let started = client.start_job(&options).await.unwrap();
        assert_eq!(started.job_id.as_str(), "job_1700000000");
        assert_eq!(started.status, "started");
    }

    #[tokio::test]
    async fn test_start_job_http_error() {
        let router = Router::new().route(
            "/api/process",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model crashed") }),
        );
        let client = client(serve(router).await);

        match client.start_job(&TaskOptions::default()).await {
            Err(JobClientError::ServiceError(msg)) => {
                assert!(msg.contains("500"));
                assert!(msg.contains("model crashed"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_start_job_application_error() {
        let router = Router::new().route(
            "/api/process",
            post(|| async { Json(json!({"error": "Please upload an image first"})) }),
        );
        let client = client(serve(router).await);

        assert!(matches!(
            client.start_job(&TaskOptions::default()).await,
            Err(JobClientError::Rejected(msg)) if msg == "Please upload an image first"
        ));
    }

    #[tokio::test]
    async fn test_get_job_status() {
        let router = Router::new().route(
            "/api/process/:job_id/status",
            get(|Path(job_id): Path<String>| async move {
                Json(json!({
                    "job_id": job_id,
                    "status": "running",
                    "progress": 42.7,
                    "current_step": "Detecting car...",
                    "elapsed_seconds": 12.5
                }))
            }),
        );
        let client = client(serve(router).await);

        let report = client.get_job_status(&JobId::new("job_9")).await.unwrap();
        assert_eq!(report.job_id.as_str(), "job_9");
        assert_eq!(report.status, JobStatus::Running);
        assert_eq!(report.progress, 42);
        assert_eq!(report.current_step, "Detecting car...");
    }

    #[tokio::test]
    async fn test_job_id_is_one_path_segment() {
        let router = Router::new().route(
            "/api/process/:job_id/status",
            get(|Path(job_id): Path<String>| async move {
                Json(json!({"job_id": job_id, "status": "pending", "progress": 0}))
            }),
        );
        let client = client(serve(router).await);

        for raw in ["job#7", "job?id=7", "batch/7", "job 7"] {
            let report = client.get_job_status(&JobId::new(raw)).await.unwrap();
            assert_eq!(report.job_id.as_str(), raw);
            assert_eq!(report.status, JobStatus::Pending);
        }
    }

    #[test]
    fn test_status_url_keeps_base_path() {
        let url = ApiBaseUrl::parse("http://gpu-box:7860/detector").unwrap().unwrap();
        let client = client(url);
        assert_eq!(
            client.status_url(&JobId::new("job#7")).unwrap().as_str(),
            "http://gpu-box:7860/detector/api/process/job%237/status"
        );
    }

    #[tokio::test]
    async fn test_get_job_status_unknown_status() {
        let router = Router::new().route(
            "/api/process/:job_id/status",
            get(|| async { Json(json!({"status": "exploded", "progress": 0})) }),
        );
        let client = client(serve(router).await);

        assert!(matches!(
            client.get_job_status(&JobId::new("job_9")).await,
            Err(JobClientError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_get_job_status_not_found() {
        let router = Router::new().route(
            "/api/process/:job_id/status",
            get(|| async { (StatusCode::NOT_FOUND, "Job not found") }),
        );
        let client = client(serve(router).await);

        assert!(matches!(
            client.get_job_status(&JobId::new("job_9")).await,
            Err(JobClientError::ServiceError(_))
        ));
    }

    #[tokio::test]
    async fn test_health_check() {
        let router = Router::new().route("/", get(|| async { "ok" }));
        let client = client(serve(router).await);
        assert!(client.health_check().await);
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // 绑定后立即释放，得到一个无人监听的端口
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = ApiBaseUrl::parse(&format!("http://{}", addr)).unwrap().unwrap();
        let client = client(url);
        assert!(matches!(
            client.start_job(&TaskOptions::default()).await,
            Err(JobClientError::NetworkError(_))
        ));
        assert!(!client.health_check().await);
    }

    #[test]
    fn test_factory_builds_client() {
        let factory = HttpJobClientFactory::new(15);
        let url = ApiBaseUrl::parse("http://localhost:7860").unwrap().unwrap();
        assert!(factory.connect(&url).is_ok());
    }
}
