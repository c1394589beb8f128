//! Chat application module for interactive conversations with DashScope
//! models.
//!
//! This module provides a streaming REPL chat interface built on top of
//! the dashscope client library. It supports:
//!
//! - Streaming responses with real-time token display
//! - Dot-commands for session control, with tab completion
//! - A persisted rc file for the API key, model, and verbose flag
//!
//! # Architecture
//!
//! The module is organized into several components:
//!
//! - [`config`]: CLI argument parsing and rc-file persistence
//! - [`commands`]: Dot-command parsing and handling
//! - [`session`]: Core chat session management and API interaction

mod commands;
mod config;
mod session;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{COMMANDS, ChatCommand, completions, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig, RcConfig};
pub use session::{ChatSession, SessionStats};
