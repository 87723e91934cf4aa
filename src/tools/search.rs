//! Workspace search tools.

use std::sync::Arc;

use async_trait::async_trait;
use notion_mcp_core::{
    McpError, McpResult, ObjectSchema, ResponseEnvelope, Schema, ToolAnnotations, ToolDescriptor,
    ToolFamily, ValidatedArgs,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::format::{self, TitleMatch};
use crate::notion::{NotionClient, Page, SearchResult};

pub const SEARCH: &str = "notion_search";
pub const SEARCH_BY_TITLE: &str = "notion_search_by_title";

const DEFAULT_PAGE_SIZE: i64 = 20;
const TITLE_SEARCH_PAGE_SIZE: u32 = 100;
const SNIPPET_BLOCKS: u32 = 3;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchArgs {
    query: Option<String>,
    filter: Option<Value>,
    sort: Option<Value>,
    page_size: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchByTitleArgs {
    title: String,
    exact_match: bool,
    in_database: Option<String>,
}

/// Case-insensitive title comparison used by `notion_search_by_title`.
pub fn title_matches(page_title: &str, wanted: &str, exact: bool) -> bool {
    let page_title = page_title.to_lowercase();
    let wanted = wanted.to_lowercase();
    if exact {
        page_title == wanted
    } else {
        page_title.contains(&wanted)
    }
}

pub struct SearchTools {
    client: Arc<NotionClient>,
}

impl SearchTools {
    pub fn new(client: Arc<NotionClient>) -> Self {
        Self { client }
    }

    async fn search(&self, args: SearchArgs) -> McpResult<ResponseEnvelope> {
        let query = args.query.as_deref().filter(|q| !q.is_empty());

        let mut body = Map::new();
        body.insert("page_size".to_string(), Value::from(args.page_size));
        if let Some(query) = query {
            body.insert("query".to_string(), Value::from(query));
        }
        if let Some(filter) = args.filter {
            body.insert("filter".to_string(), filter);
        }
        if let Some(sort) = args.sort {
            body.insert("sort".to_string(), sort);
        }

        let response = self.client.search(&Value::Object(body)).await?;
        Ok(ResponseEnvelope::text(format::format_search_results(
            &response.results,
            query,
            response.has_more,
            args.page_size,
        )))
    }

    async fn search_by_title(&self, args: SearchByTitleArgs) -> McpResult<ResponseEnvelope> {
        let body = serde_json::json!({
            "query": args.title,
            "filter": { "property": "object", "value": "page" },
            "page_size": TITLE_SEARCH_PAGE_SIZE,
        });
        let response = self.client.search(&body).await?;

        let pages: Vec<&Page> = response
            .results
            .iter()
            .filter_map(|result| match result {
                SearchResult::Page(page) => Some(page),
                SearchResult::Database(_) => None,
            })
            .filter(|page| match args.in_database.as_deref() {
                Some(database_id) => page.parent_database() == Some(database_id),
                None => true,
            })
            .filter(|page| {
                title_matches(&page.title_or_untitled(), &args.title, args.exact_match)
            })
            .collect();

        let mut matches = Vec::with_capacity(pages.len());
        for page in pages {
            let snippet = match self.client.list_block_children(&page.id, SNIPPET_BLOCKS).await {
                Ok(children) => format::snippet(&children.results),
                Err(err) => {
                    debug!(page_id = %page.id, error = %err, "Skipping preview for page");
                    String::new()
                }
            };
            matches.push(TitleMatch { page, snippet });
        }

        Ok(ResponseEnvelope::text(format::format_title_matches(
            &matches,
            &args.title,
            args.exact_match,
        )))
    }
}

#[async_trait]
impl ToolFamily for SearchTools {
    fn name(&self) -> &'static str {
        "search"
    }

    fn prefix(&self) -> &'static str {
        "notion_search"
    }

    fn tools(&self) -> Vec<ToolDescriptor> {
        let filter = ObjectSchema::new()
            .required(
                "property",
                Schema::string_enum(["object"]).with_description("Property to filter by"),
            )
            .required(
                "value",
                Schema::string_enum(["page", "database"])
                    .with_description("Filter for only pages or only databases"),
            );
        let sort = ObjectSchema::new()
            .optional(
                "direction",
                Schema::string_enum(["ascending", "descending"]).with_default("descending"),
            )
            .optional(
                "timestamp",
                Schema::string_enum(["last_edited_time"]).with_default("last_edited_time"),
            );

        vec![
            ToolDescriptor::new(
                SEARCH,
                "Search for pages and databases in Notion",
                ObjectSchema::new()
                    .optional("query", Schema::string().with_description("Search query text"))
                    .optional("filter", filter)
                    .optional("sort", sort)
                    .optional(
                        "pageSize",
                        Schema::integer()
                            .with_description("Number of results to return (max 100)")
                            .with_range(1, 100)
                            .with_default(DEFAULT_PAGE_SIZE),
                    ),
            )
            .with_annotations(ToolAnnotations::read()),
            ToolDescriptor::new(
                SEARCH_BY_TITLE,
                "Search for pages by exact or partial title match",
                ObjectSchema::new()
                    .required(
                        "title",
                        Schema::string()
                            .with_description("Title to search for (partial match supported)"),
                    )
                    .optional(
                        "exactMatch",
                        Schema::boolean()
                            .with_description("Whether to search for exact title match")
                            .with_default(false),
                    )
                    .optional(
                        "inDatabase",
                        Schema::string()
                            .with_description("Optional: Limit search to a specific database ID"),
                    ),
            )
            .with_annotations(ToolAnnotations::read()),
        ]
    }

    async fn call(&self, tool: &str, args: ValidatedArgs) -> McpResult<ResponseEnvelope> {
        match tool {
            SEARCH => self.search(args.parse()?).await,
            SEARCH_BY_TITLE => self.search_by_title(args.parse()?).await,
            other => Err(McpError::UnknownTool(other.to_string())),
        }
    }
}
