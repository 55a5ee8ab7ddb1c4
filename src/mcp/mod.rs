//! Model Context Protocol surface

pub mod server;

pub use server::RmfMcpServer;

/// Server name advertised over MCP.
pub const SERVER_NAME: &str = "rmfx";
/// Server version (same as crate version).
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
