// Public modules
pub mod chat;
pub mod client;
pub mod error;
pub mod observability;
pub mod render;
pub mod sse;
pub mod streaming;
pub mod types;

// Re-exports
pub use client::DashScope;
pub use error::{Error, Result};
pub use render::{PlainTextRenderer, Renderer};
pub use sse::{SseEvent, process_sse};
pub use streaming::{DeltaTracker, accumulate};
pub use types::*;
