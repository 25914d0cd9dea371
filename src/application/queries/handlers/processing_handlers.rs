//! Processing Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{EndpointSettings, JobClientFactoryPort, ProcessingControllerPort};
use crate::application::queries::processing_queries::*;
use crate::domain::processing::{ExecutionMode, ProcessingSnapshot};

/// GetProcessingState Handler
pub struct GetProcessingStateHandler {
    controller: Arc<dyn ProcessingControllerPort>,
}

impl GetProcessingStateHandler {
    pub fn new(controller: Arc<dyn ProcessingControllerPort>) -> Self {
        Self { controller }
    }

    pub fn handle(&self, _query: GetProcessingState) -> Result<ProcessingSnapshot, ApplicationError> {
        Ok(self.controller.snapshot())
    }
}

/// GetEndpoint Handler
pub struct GetEndpointHandler {
    controller: Arc<dyn ProcessingControllerPort>,
}

impl GetEndpointHandler {
    pub fn new(controller: Arc<dyn ProcessingControllerPort>) -> Self {
        Self { controller }
    }

    pub fn handle(&self, _query: GetEndpoint) -> Result<EndpointSettings, ApplicationError> {
        Ok(self.controller.endpoint())
    }
}

/// CheckDetectionHealth Handler
///
/// 按当前端点临时创建客户端，不影响进行中的任务
pub struct CheckDetectionHealthHandler {
    controller: Arc<dyn ProcessingControllerPort>,
    client_factory: Arc<dyn JobClientFactoryPort>,
}

impl CheckDetectionHealthHandler {
    pub fn new(
        controller: Arc<dyn ProcessingControllerPort>,
        client_factory: Arc<dyn JobClientFactoryPort>,
    ) -> Self {
        Self {
            controller,
            client_factory,
        }
    }

    pub async fn handle(
        &self,
        _query: CheckDetectionHealth,
    ) -> Result<DetectionHealth, ApplicationError> {
        let settings = self.controller.endpoint();
        let connected = match (&settings.url, settings.mode) {
            (Some(url), ExecutionMode::Remote) => {
                let client = self.client_factory.connect(url)?;
                client.health_check().await
            }
            _ => true,
        };

        tracing::debug!(
            mode = settings.mode.as_str(),
            connected = connected,
            "Detection health checked"
        );
        Ok(DetectionHealth {
            url: settings.url.map(|u| u.as_str().to_string()),
            mode: settings.mode,
            connected,
        })
    }
}
