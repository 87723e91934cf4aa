//! Block tools: append, list, edit, and delete content blocks.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use notion_mcp_core::{
    McpError, McpResult, ObjectSchema, ResponseEnvelope, Schema, ToolAnnotations, ToolDescriptor,
    ToolFamily, ValidatedArgs,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{convert, format};
use crate::notion::{Block, BlockContent, NotionClient};

pub const APPEND: &str = "notion_block_append";
pub const GET_CHILDREN: &str = "notion_block_get_children";
pub const UPDATE: &str = "notion_block_update";
pub const DELETE: &str = "notion_block_delete";

const CHILDREN_PAGE_SIZE: u32 = 100;
const DEFAULT_CODE_LANGUAGE: &str = "plain text";

/// Block types that can be created through `notion_block_append`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum NewBlockKind {
    #[serde(rename = "paragraph")]
    Paragraph,
    #[serde(rename = "heading_1")]
    Heading1,
    #[serde(rename = "heading_2")]
    Heading2,
    #[serde(rename = "heading_3")]
    Heading3,
    #[serde(rename = "bulleted_list_item")]
    BulletedListItem,
    #[serde(rename = "numbered_list_item")]
    NumberedListItem,
    #[serde(rename = "to_do")]
    ToDo,
    #[serde(rename = "code")]
    Code,
    #[serde(rename = "quote")]
    Quote,
    #[serde(rename = "divider")]
    Divider,
}

impl NewBlockKind {
    pub const ALL: [NewBlockKind; 10] = [
        NewBlockKind::Paragraph,
        NewBlockKind::Heading1,
        NewBlockKind::Heading2,
        NewBlockKind::Heading3,
        NewBlockKind::BulletedListItem,
        NewBlockKind::NumberedListItem,
        NewBlockKind::ToDo,
        NewBlockKind::Code,
        NewBlockKind::Quote,
        NewBlockKind::Divider,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NewBlockKind::Paragraph => "paragraph",
            NewBlockKind::Heading1 => "heading_1",
            NewBlockKind::Heading2 => "heading_2",
            NewBlockKind::Heading3 => "heading_3",
            NewBlockKind::BulletedListItem => "bulleted_list_item",
            NewBlockKind::NumberedListItem => "numbered_list_item",
            NewBlockKind::ToDo => "to_do",
            NewBlockKind::Code => "code",
            NewBlockKind::Quote => "quote",
            NewBlockKind::Divider => "divider",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewBlock {
    #[serde(rename = "type")]
    pub kind: NewBlockKind,
    pub content: Option<String>,
    pub checked: Option<bool>,
    pub language: Option<String>,
}

impl NewBlock {
    /// Notion block object for a `children` array.
    pub fn to_notion(&self) -> Value {
        let content = self.content.as_deref().unwrap_or_default();
        let kind = self.kind.as_str();
        match self.kind {
            NewBlockKind::Divider => json!({ "object": "block", "type": kind, "divider": {} }),
            NewBlockKind::ToDo => json!({
                "object": "block",
                "type": kind,
                "to_do": {
                    "rich_text": convert::rich_text(content),
                    "checked": self.checked.unwrap_or(false),
                },
            }),
            NewBlockKind::Code => json!({
                "object": "block",
                "type": kind,
                "code": {
                    "rich_text": convert::rich_text(content),
                    "language": self.language.as_deref().unwrap_or(DEFAULT_CODE_LANGUAGE),
                },
            }),
            _ => convert::text_block(kind, content),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendArgs {
    parent_id: String,
    blocks: Vec<NewBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetChildrenArgs {
    block_id: String,
    recursive: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateArgs {
    block_id: String,
    content: Option<String>,
    checked: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockIdArgs {
    block_id: String,
}

/// Update payload for an existing block of the given content.
///
/// New text replaces the block's rich text (dividers have none); `checked`
/// applies only to to-do blocks.
pub fn block_update_body(
    existing: &BlockContent,
    content: Option<&str>,
    checked: Option<bool>,
) -> Value {
    let mut body = Map::new();
    let is_todo = matches!(existing, BlockContent::ToDo { .. });

    match (content, checked) {
        (Some(text), _) if is_todo => {
            let mut todo = Map::new();
            todo.insert("rich_text".to_string(), convert::rich_text(text));
            if let Some(checked) = checked {
                todo.insert("checked".to_string(), Value::Bool(checked));
            }
            body.insert("to_do".to_string(), Value::Object(todo));
        }
        (Some(text), _) => {
            if !matches!(existing, BlockContent::Divider) {
                body.insert(
                    existing.kind().to_string(),
                    json!({ "rich_text": convert::rich_text(text) }),
                );
            }
        }
        (None, Some(checked)) if is_todo => {
            body.insert("to_do".to_string(), json!({ "checked": checked }));
        }
        (None, _) => {}
    }

    Value::Object(body)
}

pub struct BlockTools {
    client: Arc<NotionClient>,
}

impl BlockTools {
    pub fn new(client: Arc<NotionClient>) -> Self {
        Self { client }
    }

    async fn append(&self, args: AppendArgs) -> McpResult<ResponseEnvelope> {
        let children: Vec<Value> = args.blocks.iter().map(NewBlock::to_notion).collect();
        let appended = self
            .client
            .append_block_children(&args.parent_id, &children)
            .await?;

        Ok(ResponseEnvelope::text(format!(
            "Successfully appended {} blocks to {}",
            appended.results.len(),
            args.parent_id
        )))
    }

    /// Children of `block_id`, descending into nested blocks when `recursive`.
    fn fetch_children<'a>(
        &'a self,
        block_id: &'a str,
        recursive: bool,
    ) -> BoxFuture<'a, McpResult<Vec<Block>>> {
        async move {
            let mut blocks = self
                .client
                .list_block_children(block_id, CHILDREN_PAGE_SIZE)
                .await?
                .results;

            if recursive {
                for block in blocks.iter_mut().filter(|b| b.has_children) {
                    block.children = self.fetch_children(&block.id, true).await?;
                }
            }
            Ok(blocks)
        }
        .boxed()
    }

    async fn get_children(&self, args: GetChildrenArgs) -> McpResult<ResponseEnvelope> {
        let blocks = self.fetch_children(&args.block_id, args.recursive).await?;
        Ok(ResponseEnvelope::text(format!(
            "# Block Children\n\n{}",
            format::render_block_tree(&blocks, 0)
        )))
    }

    async fn update(&self, args: UpdateArgs) -> McpResult<ResponseEnvelope> {
        let existing = self.client.retrieve_block(&args.block_id).await?;
        let body = block_update_body(&existing.content, args.content.as_deref(), args.checked);
        self.client.update_block(&args.block_id, &body).await?;
        Ok(ResponseEnvelope::text(format!(
            "Updated block {}",
            args.block_id
        )))
    }

    async fn delete(&self, args: BlockIdArgs) -> McpResult<ResponseEnvelope> {
        self.client.delete_block(&args.block_id).await?;
        Ok(ResponseEnvelope::text(format!(
            "Deleted block {}",
            args.block_id
        )))
    }
}

#[async_trait]
impl ToolFamily for BlockTools {
    fn name(&self) -> &'static str {
        "block"
    }

    fn prefix(&self) -> &'static str {
        "notion_block_"
    }

    fn tools(&self) -> Vec<ToolDescriptor> {
        let new_block = ObjectSchema::new()
            .required(
                "type",
                Schema::string_enum(NewBlockKind::ALL.iter().map(|k| k.as_str())),
            )
            .optional(
                "content",
                Schema::string().with_description("Text content of the block"),
            )
            .optional(
                "checked",
                Schema::boolean().with_description("For to_do blocks, whether it's checked"),
            )
            .optional(
                "language",
                Schema::string().with_description("For code blocks, the programming language"),
            );

        vec![
            ToolDescriptor::new(
                APPEND,
                "Append blocks to a page or another block",
                ObjectSchema::new()
                    .required(
                        "parentId",
                        Schema::string().with_description("ID of the parent page or block"),
                    )
                    .required(
                        "blocks",
                        Schema::array(new_block).with_description("Array of blocks to append"),
                    ),
            )
            .with_annotations(ToolAnnotations::write()),
            ToolDescriptor::new(
                GET_CHILDREN,
                "Get all child blocks of a page or block",
                ObjectSchema::new()
                    .required(
                        "blockId",
                        Schema::string().with_description("ID of the parent block or page"),
                    )
                    .optional(
                        "recursive",
                        Schema::boolean()
                            .with_description("Whether to fetch nested blocks recursively")
                            .with_default(false),
                    ),
            )
            .with_annotations(ToolAnnotations::read()),
            ToolDescriptor::new(
                UPDATE,
                "Update an existing block",
                ObjectSchema::new()
                    .required(
                        "blockId",
                        Schema::string().with_description("ID of the block to update"),
                    )
                    .optional(
                        "content",
                        Schema::string().with_description("New content for the block"),
                    )
                    .optional(
                        "checked",
                        Schema::boolean()
                            .with_description("For to_do blocks, whether it's checked"),
                    ),
            )
            .with_annotations(ToolAnnotations::write().with_idempotent(true)),
            ToolDescriptor::new(
                DELETE,
                "Delete a block",
                ObjectSchema::new().required(
                    "blockId",
                    Schema::string().with_description("ID of the block to delete"),
                ),
            )
            .with_annotations(ToolAnnotations::delete()),
        ]
    }

    async fn call(&self, tool: &str, args: ValidatedArgs) -> McpResult<ResponseEnvelope> {
        match tool {
            APPEND => self.append(args.parse()?).await,
            GET_CHILDREN => self.get_children(args.parse()?).await,
            UPDATE => self.update(args.parse()?).await,
            DELETE => self.delete(args.parse()?).await,
            other => Err(McpError::UnknownTool(other.to_string())),
        }
    }
}
