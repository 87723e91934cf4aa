//! Database tools: query rows, create and update row pages, read the schema.

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

pub const QUERY: &str = "notion_database_query";
pub const CREATE_PAGE: &str = "notion_database_create_page";
pub const UPDATE_PAGE: &str = "notion_database_update_page";
pub const GET_SCHEMA: &str = "notion_database_get_schema";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryArgs {
    database_id: String,
    filter: Option<Value>,
    sorts: Option<Vec<Value>>,
    page_size: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePageArgs {
    database_id: String,
    properties: Map<String, Value>,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePageArgs {
    page_id: String,
    properties: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DatabaseIdArgs {
    database_id: String,
}

pub struct DatabaseTools {
    client: Arc<NotionClient>,
}

impl DatabaseTools {
    pub fn new(client: Arc<NotionClient>) -> Self {
        Self { client }
    }

    async fn query(&self, args: QueryArgs) -> McpResult<ResponseEnvelope> {
        let mut body = Map::new();
        body.insert("page_size".to_string(), json!(args.page_size));
        if let Some(filter) = args.filter {
            body.insert("filter".to_string(), filter);
        }
        if let Some(sorts) = args.sorts {
            body.insert("sorts".to_string(), Value::Array(sorts));
        }

        let rows = self
            .client
            .query_database(&args.database_id, &Value::Object(body))
            .await?;
        Ok(ResponseEnvelope::text(format::format_query_results(
            &rows.results,
        )))
    }

    async fn create_page(&self, args: CreatePageArgs) -> McpResult<ResponseEnvelope> {
        let children: Vec<Value> = args
            .content
            .as_deref()
            .filter(|c| !c.is_empty())
            .map(convert::paragraph)
            .into_iter()
            .collect();

        let body = json!({
            "parent": { "database_id": args.database_id },
            "properties": convert::convert_properties(&args.properties),
            "children": children,
        });
        let page = self.client.create_page(&body).await?;

        Ok(ResponseEnvelope::text(format!(
            "Created database page with ID: {}\nURL: {}",
            page.id,
            page.url.as_deref().unwrap_or("N/A")
        )))
    }

    async fn update_page(&self, args: UpdatePageArgs) -> McpResult<ResponseEnvelope> {
        let body = json!({ "properties": convert::convert_properties(&args.properties) });
        let page = self.client.update_page(&args.page_id, &body).await?;
        Ok(ResponseEnvelope::text(format!(
            "Updated database page {}",
            page.id
        )))
    }

    async fn get_schema(&self, args: DatabaseIdArgs) -> McpResult<ResponseEnvelope> {
        let database = self.client.retrieve_database(&args.database_id).await?;
        Ok(ResponseEnvelope::text(format::format_schema(&database)))
    }
}

fn database_id_schema() -> Schema {
    Schema::string().with_description("The ID of the database")
}

#[async_trait]
impl ToolFamily for DatabaseTools {
    fn name(&self) -> &'static str {
        "database"
    }

    fn prefix(&self) -> &'static str {
        "notion_database_"
    }

    fn tools(&self) -> Vec<ToolDescriptor> {
        let sort = ObjectSchema::new()
            .required("property", Schema::string())
            .required(
                "direction",
                Schema::string_enum(["ascending", "descending"]),
            );

        vec![
            ToolDescriptor::new(
                QUERY,
                "Query a Notion database with filters and sorting",
                ObjectSchema::new()
                    .required(
                        "databaseId",
                        Schema::string().with_description("The ID of the database to query"),
                    )
                    .optional(
                        "filter",
                        Schema::any_object().with_description("Filter object (Notion API format)"),
                    )
                    .optional(
                        "sorts",
                        Schema::array(sort).with_description("Array of sort objects"),
                    )
                    .optional(
                        "pageSize",
                        Schema::integer()
                            .with_range(1, 100)
                            .with_description("Number of results to return (max 100)")
                            .with_default(10),
                    ),
            )
            .with_annotations(ToolAnnotations::read()),
            ToolDescriptor::new(
                CREATE_PAGE,
                "Create a new page in a Notion database",
                ObjectSchema::new()
                    .required("databaseId", database_id_schema())
                    .required(
                        "properties",
                        Schema::any_object()
                            .with_description("Properties for the new database page"),
                    )
                    .optional(
                        "content",
                        Schema::string().with_description("Optional content for the page"),
                    ),
            )
            .with_annotations(ToolAnnotations::write()),
            ToolDescriptor::new(
                UPDATE_PAGE,
                "Update a page in a Notion database",
                ObjectSchema::new()
                    .required(
                        "pageId",
                        Schema::string().with_description("The ID of the page to update"),
                    )
                    .required(
                        "properties",
                        Schema::any_object().with_description("Properties to update"),
                    ),
            )
            .with_annotations(ToolAnnotations::write().with_idempotent(true)),
            ToolDescriptor::new(
                GET_SCHEMA,
                "Get the schema (properties) of a Notion database",
                ObjectSchema::new().required("databaseId", database_id_schema()),
            )
            .with_annotations(ToolAnnotations::read()),
        ]
    }

    async fn call(&self, tool: &str, args: ValidatedArgs) -> McpResult<ResponseEnvelope> {
        match tool {
            QUERY => self.query(args.parse()?).await,
            CREATE_PAGE => self.create_page(args.parse()?).await,
            UPDATE_PAGE => self.update_page(args.parse()?).await,
            GET_SCHEMA => self.get_schema(args.parse()?).await,
            other => Err(McpError::UnknownTool(other.to_string())),
        }
    }
}
