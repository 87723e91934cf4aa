//! Notion MCP server: exposes a Notion workspace as MCP tools over stdio.

pub mod config;
pub mod logging;
pub mod notion;
pub mod server;
pub mod tools;

pub use config::{Cli, NotionConfig, ServerConfig};
pub use server::NotionMcpServer;
