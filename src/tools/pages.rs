//! Page tools: create, read, update, and archive pages.

use std::sync::Arc;

use async_trait::async_trait;
use notion_mcp_core::{
    McpError, McpResult, ObjectSchema, ResponseEnvelope, Schema, ToolAnnotations, ToolDescriptor,
    ToolFamily, ValidatedArgs,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{convert, format};
use crate::notion::NotionClient;

pub const CREATE: &str = "notion_page_create";
pub const GET: &str = "notion_page_get";
pub const UPDATE: &str = "notion_page_update";
pub const DELETE: &str = "notion_page_delete";

/// Children fetched when a page is read with its content.
const CONTENT_PAGE_SIZE: u32 = 100;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateArgs {
    title: String,
    content: Option<String>,
    parent_page_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetArgs {
    page_id: String,
    include_content: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateArgs {
    page_id: String,
    title: Option<String>,
    archived: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageIdArgs {
    page_id: String,
}

pub struct PageTools {
    client: Arc<NotionClient>,
}

impl PageTools {
    pub fn new(client: Arc<NotionClient>) -> Self {
        Self { client }
    }

    async fn create(&self, args: CreateArgs) -> McpResult<ResponseEnvelope> {
        let children = args
            .content
            .as_deref()
            .map(convert::paragraphs_from_lines)
            .unwrap_or_default();

        let parent = match &args.parent_page_id {
            Some(page_id) => json!({ "page_id": page_id }),
            None => json!({ "workspace": true }),
        };

        let body = json!({
            "parent": parent,
            "properties": convert::title_properties(&args.title),
            "children": children,
        });
        let page = self.client.create_page(&body).await?;

        Ok(ResponseEnvelope::text(format::format_created_page(
            &args.title,
            &page,
        )))
    }

    async fn get(&self, args: GetArgs) -> McpResult<ResponseEnvelope> {
        let page = self.client.retrieve_page(&args.page_id).await?;

        let blocks = if args.include_content {
            Some(
                self.client
                    .list_block_children(&args.page_id, CONTENT_PAGE_SIZE)
                    .await?
                    .results,
            )
        } else {
            None
        };

        Ok(ResponseEnvelope::text(format::format_page(
            &page,
            blocks.as_deref(),
        )))
    }

    async fn update(&self, args: UpdateArgs) -> McpResult<ResponseEnvelope> {
        let title = args.title.as_deref().filter(|t| !t.is_empty());

        let mut body = Map::new();
        if let Some(title) = title {
            body.insert("properties".to_string(), convert::title_properties(title));
        }
        if let Some(archived) = args.archived {
            body.insert("archived".to_string(), Value::Bool(archived));
        }

        let page = self
            .client
            .update_page(&args.page_id, &Value::Object(body))
            .await?;

        Ok(ResponseEnvelope::text(format::format_updated_page(
            &page.id,
            title,
            args.archived,
        )))
    }

    async fn delete(&self, args: PageIdArgs) -> McpResult<ResponseEnvelope> {
        self.client
            .update_page(&args.page_id, &json!({ "archived": true }))
            .await?;
        Ok(ResponseEnvelope::text(format!(
            "Archived page {}",
            args.page_id
        )))
    }
}

#[async_trait]
impl ToolFamily for PageTools {
    fn name(&self) -> &'static str {
        "page"
    }

    fn prefix(&self) -> &'static str {
        "notion_page_"
    }

    fn tools(&self) -> Vec<ToolDescriptor> {
        vec![
            ToolDescriptor::new(
                CREATE,
                "Create a new Notion page",
                ObjectSchema::new()
                    .required("title", Schema::string().with_description("Title of the page"))
                    .optional(
                        "content",
                        Schema::string()
                            .with_description("Content of the page (one paragraph per line)"),
                    )
                    .optional(
                        "parentPageId",
                        Schema::string().with_description(
                            "Parent page ID (optional, creates in workspace root if not provided)",
                        ),
                    ),
            )
            .with_annotations(ToolAnnotations::write()),
            ToolDescriptor::new(
                GET,
                "Get a Notion page by ID",
                ObjectSchema::new()
                    .required(
                        "pageId",
                        Schema::string().with_description("The ID of the page to retrieve"),
                    )
                    .optional(
                        "includeContent",
                        Schema::boolean()
                            .with_description("Whether to include page content blocks")
                            .with_default(true),
                    ),
            )
            .with_annotations(ToolAnnotations::read()),
            ToolDescriptor::new(
                UPDATE,
                "Update a Notion page",
                ObjectSchema::new()
                    .required(
                        "pageId",
                        Schema::string().with_description("The ID of the page to update"),
                    )
                    .optional(
                        "title",
                        Schema::string().with_description("New title for the page"),
                    )
                    .optional(
                        "archived",
                        Schema::boolean().with_description("Archive/unarchive the page"),
                    ),
            )
            .with_annotations(ToolAnnotations::write().with_idempotent(true)),
            ToolDescriptor::new(
                DELETE,
                "Delete (archive) a Notion page",
                ObjectSchema::new().required(
                    "pageId",
                    Schema::string().with_description("The ID of the page to delete"),
                ),
            )
            .with_annotations(ToolAnnotations::delete()),
        ]
    }

    async fn call(&self, tool: &str, args: ValidatedArgs) -> McpResult<ResponseEnvelope> {
        match tool {
            CREATE => self.create(args.parse()?).await,
            GET => self.get(args.parse()?).await,
            UPDATE => self.update(args.parse()?).await,
            DELETE => self.delete(args.parse()?).await,
            other => Err(McpError::UnknownTool(other.to_string())),
        }
    }
}
