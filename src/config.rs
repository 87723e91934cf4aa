//! Process configuration from flags and environment.
//!
//! Every setting has an environment variable so the server can be configured
//! entirely from an MCP host's launch config. A `.env` file in the working
//! directory is loaded before parsing.

use std::time::Duration;

use clap::Parser;
use secrecy::SecretString;

use crate::logging::LoggingConfig;

pub const DEFAULT_API_VERSION: &str = "2022-06-28";
pub const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";

#[derive(Debug, Parser)]
#[command(
    name = "notion-mcp-server",
    version,
    about = "MCP server exposing a Notion workspace as tools over stdio"
)]
pub struct Cli {
    /// Notion integration token. Without it the server starts in setup-required mode.
    #[arg(long, env = "NOTION_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Value sent in the `Notion-Version` header.
    #[arg(long, env = "NOTION_API_VERSION", default_value = DEFAULT_API_VERSION)]
    pub api_version: String,

    #[arg(long, env = "NOTION_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(long, env = "NOTION_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    #[arg(long, env = "NOTION_CONNECT_TIMEOUT_SECS", default_value_t = 10)]
    pub connect_timeout_secs: u64,

    /// Wait before the single retry when a rate-limit response has no Retry-After.
    #[arg(long, env = "NOTION_RATE_LIMIT_FALLBACK_SECS", default_value_t = 5)]
    pub rate_limit_fallback_secs: u64,

    /// Log filter directive, e.g. `info` or `notion_mcp=debug`.
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines.
    #[arg(long, env = "NOTION_MCP_LOG_JSON")]
    pub log_json: bool,
}

/// Settings for the Notion REST client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotionConfig {
    pub base_url: String,
    pub api_version: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub rate_limit_fallback: Duration,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            rate_limit_fallback: Duration::from_secs(5),
        }
    }
}

#[derive(Debug)]
pub struct ServerConfig {
    /// `None` when unset or blank.
    pub api_key: Option<SecretString>,
    pub notion: NotionConfig,
    pub logging: LoggingConfig,
}

impl Cli {
    pub fn into_config(self) -> ServerConfig {
        let api_key = self
            .api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .map(SecretString::from);

        ServerConfig {
            api_key,
            notion: NotionConfig {
                base_url: self.base_url.trim_end_matches('/').to_string(),
                api_version: self.api_version,
                request_timeout: Duration::from_secs(self.request_timeout_secs),
                connect_timeout: Duration::from_secs(self.connect_timeout_secs),
                rate_limit_fallback: Duration::from_secs(self.rate_limit_fallback_secs),
            },
            logging: LoggingConfig {
                level: self.log_level,
                json: self.log_json,
            },
        }
    }
}
