//! Notion tool families and the registry they form.

use std::sync::Arc;

use notion_mcp_core::{McpResult, SetupNotice, ToolRegistry};

use crate::notion::NotionClient;

pub mod blocks;
pub mod convert;
pub mod databases;
pub mod format;
pub mod pages;
pub mod search;

pub use blocks::BlockTools;
pub use databases::DatabaseTools;
pub use pages::PageTools;
pub use search::SearchTools;

pub const SETUP_TOOL: &str = "notion_setup_required";

/// Registry of every Notion tool, listed page, database, block, then search.
pub fn build_registry(client: Arc<NotionClient>) -> McpResult<ToolRegistry> {
    ToolRegistry::builder()
        .family(Arc::new(PageTools::new(Arc::clone(&client))))
        .family(Arc::new(DatabaseTools::new(Arc::clone(&client))))
        .family(Arc::new(BlockTools::new(Arc::clone(&client))))
        .family(Arc::new(SearchTools::new(client)))
        .build()
}

/// What the server offers when started without an API key.
pub fn setup_notice() -> SetupNotice {
    SetupNotice::new(
        SETUP_TOOL,
        "Notion API key not configured. Set NOTION_API_KEY environment variable.",
        "Notion API key not configured. Please set the NOTION_API_KEY environment variable in the server's environment.",
    )
}
