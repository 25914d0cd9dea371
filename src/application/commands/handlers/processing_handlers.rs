//! Processing Command Handlers

use std::sync::Arc;

use crate::application::commands::processing_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::{EndpointSettings, ProcessingControllerPort, RunOutcome};
use crate::domain::processing::{ApiBaseUrl, ProcessingSnapshot};

/// RunProcessing Handler - 开始处理任务
pub struct RunProcessingHandler {
    controller: Arc<dyn ProcessingControllerPort>,
}

impl RunProcessingHandler {
    pub fn new(controller: Arc<dyn ProcessingControllerPort>) -> Self {
        Self { controller }
    }

    /// 已有任务进行中或启动失败不算错误，通过 `accepted = false` 返回
    pub fn handle(&self, cmd: RunProcessingCommand) -> Result<RunProcessingResponse, ApplicationError> {
        let response = match self.controller.run(cmd.options) {
            RunOutcome::Started { mode, .. } => RunProcessingResponse {
                accepted: true,
                mode,
                reason: None,
            },
            RunOutcome::AlreadyRunning => {
                let mode = self
                    .controller
                    .snapshot()
                    .mode
                    .unwrap_or_else(|| self.controller.endpoint().mode);
                RunProcessingResponse {
                    accepted: false,
                    mode,
                    reason: Some("A processing job is already running".to_string()),
                }
            }
            RunOutcome::StartFailed { reason } => RunProcessingResponse {
                accepted: false,
                mode: self.controller.endpoint().mode,
                reason: Some(reason),
            },
        };

        tracing::debug!(
            accepted = response.accepted,
            mode = response.mode.as_str(),
            "Run processing handled"
        );
        Ok(response)
    }
}

/// ResetProcessing Handler - 取消任务并恢复初始状态
pub struct ResetProcessingHandler {
    controller: Arc<dyn ProcessingControllerPort>,
}

impl ResetProcessingHandler {
    pub fn new(controller: Arc<dyn ProcessingControllerPort>) -> Self {
        Self { controller }
    }

    pub fn handle(&self, _cmd: ResetProcessingCommand) -> Result<ProcessingSnapshot, ApplicationError> {
        self.controller.reset();
        Ok(self.controller.snapshot())
    }
}

/// ConfigureEndpoint Handler - 修改检测服务端点
pub struct ConfigureEndpointHandler {
    controller: Arc<dyn ProcessingControllerPort>,
}

impl ConfigureEndpointHandler {
    pub fn new(controller: Arc<dyn ProcessingControllerPort>) -> Self {
        Self { controller }
    }

    pub fn handle(&self, cmd: ConfigureEndpointCommand) -> Result<EndpointSettings, ApplicationError> {
        // 先校验再修改，URL 无效时不改变任何设置
        let url = cmd
            .url
            .as_deref()
            .map(ApiBaseUrl::parse)
            .transpose()
            .map_err(|e| ApplicationError::validation(e.to_string()))?;

        if let Some(url) = url {
            self.controller.set_endpoint(url);
        }
        if let Some(force_mock) = cmd.force_mock {
            self.controller.set_force_mock(force_mock);
        }

        Ok(self.controller.endpoint())
    }
}
