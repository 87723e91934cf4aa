//! Notion REST API access.

pub mod client;
pub mod model;

pub use client::NotionClient;
pub use model::{Block, BlockContent, Database, List, Page, PropertyValue, SearchResult};
