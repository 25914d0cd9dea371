//! Detection Adapters - 检测服务适配器

mod http_job_client;

pub use http_job_client::{HttpJobClient, HttpJobClientConfig, HttpJobClientFactory};
