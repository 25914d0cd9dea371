//! Query Handlers 实现
//!
//! 所有 QueryHandler 的具体实现

mod processing_handlers;

pub use processing_handlers::*;
