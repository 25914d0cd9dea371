//! Command Handlers 实现
//!
//! 所有 CommandHandler 的具体实现

mod processing_handlers;

pub use processing_handlers::*;
