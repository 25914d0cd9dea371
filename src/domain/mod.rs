//! Domain Layer - 领域层
//!
//! 包含一个限界上下文:
//! - Processing Context: 检测任务处理生命周期

pub mod processing;
