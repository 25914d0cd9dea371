//! Aerolens - 无人机巡检处理任务服务
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Processing Context: 处理任务状态机、步骤流水线
//!
//! 应用层 (application/):
//! - Ports: 端口定义（JobClient, ProcessingEvents, CacheInvalidation, ProcessingController）
//! - Commands: CQRS 命令处理器
//! - Queries: CQRS 查询处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API + WebSocket
//! - Worker: ProcessingController 与 mock / remote 任务策略
//! - Adapters: 检测服务 HTTP 客户端
//! - Events: WebSocket 事件发布

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
