//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::{
    // Command handlers
    ConfigureEndpointHandler, ResetProcessingHandler, RunProcessingHandler,
    // Query handlers
    CheckDetectionHealthHandler, GetEndpointHandler, GetProcessingStateHandler,
    // Ports
    JobClientFactoryPort, ProcessingControllerPort,
};
use crate::infrastructure::events::EventPublisher;

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub controller: Arc<dyn ProcessingControllerPort>,
    pub event_publisher: Arc<EventPublisher>,

    // ========== Command Handlers ==========
    pub run_processing_handler: RunProcessingHandler,
    pub reset_processing_handler: ResetProcessingHandler,
    pub configure_endpoint_handler: ConfigureEndpointHandler,

    // ========== Query Handlers ==========
    pub get_processing_state_handler: GetProcessingStateHandler,
    pub get_endpoint_handler: GetEndpointHandler,
    pub check_detection_health_handler: CheckDetectionHealthHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        controller: Arc<dyn ProcessingControllerPort>,
        client_factory: Arc<dyn JobClientFactoryPort>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            // Ports
            controller: controller.clone(),
            event_publisher,

            // Command handlers
            run_processing_handler: RunProcessingHandler::new(controller.clone()),
            reset_processing_handler: ResetProcessingHandler::new(controller.clone()),
            configure_endpoint_handler: ConfigureEndpointHandler::new(controller.clone()),

            // Query handlers
            get_processing_state_handler: GetProcessingStateHandler::new(controller.clone()),
            get_endpoint_handler: GetEndpointHandler::new(controller.clone()),
            check_detection_health_handler: CheckDetectionHealthHandler::new(
                controller,
                client_factory,
            ),
        }
    }
}
