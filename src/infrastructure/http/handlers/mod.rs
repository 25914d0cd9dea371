//! HTTP Handlers

mod ping;
mod processing;
mod websocket;

pub use ping::*;
pub use processing::*;
pub use websocket::*;
