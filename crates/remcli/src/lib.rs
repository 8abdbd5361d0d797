//! Drives the Reminders and Calendar applications through generated
//! AppleScript and exposes the operations over HTTP.

pub mod bridge;
pub mod cli;
pub mod config;
pub mod dates;
pub mod dispatcher;
pub mod error;
pub mod logging;
pub mod mapper;
pub mod parser;
pub mod platform;
pub mod server;
pub mod types;

pub use bridge::AutomationBridge;
pub use config::{BridgeConfig, ServerConfig};
pub use dispatcher::Dispatcher;
pub use error::{BridgeError, BridgeResult, ErrorKind};
pub use server::Server;
pub use types::OperationResponse;
