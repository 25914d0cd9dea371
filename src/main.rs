//! Aerolens - 无人机巡检处理任务服务
//!
//! - Domain: processing/ (Bounded Context)
//! - Application: commands, queries, ports
//! - Infrastructure: http, worker, adapters, events

use std::sync::Arc;

use aerolens::application::ProcessingControllerPort;
use aerolens::config::{load_config, print_config, AppConfig};
use aerolens::infrastructure::adapters::HttpJobClientFactory;
use aerolens::infrastructure::events::EventPublisher;
use aerolens::infrastructure::http::{AppState, HttpServer};
use aerolens::infrastructure::worker::{ProcessingController, ProcessingControllerConfig};

fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},aerolens={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("Aerolens - 无人机巡检处理任务服务");
    print_config(&config);

    // 创建事件发布器（同时承担缓存失效通知）
    let event_publisher = EventPublisher::new().arc();

    // 创建处理任务控制器
    let controller_config = ProcessingControllerConfig {
        endpoint: config.detection.endpoint()?,
        force_mock: config.detection.force_mock,
        poll_interval: config.processing.poll_interval(),
        mock_step_durations: config.processing.mock_step_durations(),
        max_consecutive_poll_failures: config.processing.max_consecutive_poll_failures,
        max_poll_duration: config.processing.max_poll_duration(),
        default_options: config.processing.task_options.clone(),
    };
    let client_factory = Arc::new(HttpJobClientFactory::new(config.detection.timeout_secs));
    let controller = ProcessingController::new(
        controller_config,
        client_factory.clone(),
        event_publisher.clone(),
        event_publisher.clone(),
    )
    .arc();

    // 创建 HTTP 服务器
    let state = AppState::new(controller.clone(), client_factory, event_publisher);
    let server = HttpServer::bind(&config.server.addr(), state).await?;

    // 启动服务器（带优雅关闭）
    server
        .serve_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    // 取消进行中的任务
    controller.reset();
    tracing::info!("Server shutdown complete");

    Ok(())
}
