//! Pixelblaze WS - minimal WebSocket client for a Pixelblaze LED controller.
//!
//! Sends `{"setVars": {...}}` commands that select a display mode and color
//! on the pattern running on the device.
//!
//! # Architecture
//!
//! - **Frame encoder** - single masked text frames, payload <= 125 bytes
//! - **Handshake** - fixed upgrade request, lenient or strict response check
//! - **Connection** - owns the TCP stream, writes frames
//! - **Command mapper** - closed command vocabulary to variable records
//! - **Session** - one-shot send, stdin/stdout bridge, detection sequence
//!
//! # Modules
//!
//! - [`frame`] - WebSocket frame encoding
//! - [`handshake`] - upgrade request and response validation
//! - [`ws`] - device connection
//! - [`vars`] - `setVars` records
//! - [`command`] - command parsing
//! - [`session`] - session drivers
//! - [`config`] - configuration loading

pub mod command;
pub mod config;
pub mod constants;
pub mod error;
pub mod frame;
pub mod handshake;
pub mod logging;
pub mod session;
pub mod vars;
pub mod ws;

// Re-export commonly used types
pub use command::{Command, Rgb8};
pub use config::Config;
pub use error::{Error, Result};
pub use handshake::HandshakeMode;
pub use session::{BridgeSummary, SequenceStep, Session};
pub use vars::{Mode, VarRecord};
pub use ws::Connection;
