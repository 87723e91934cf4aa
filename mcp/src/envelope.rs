//! Uniform response shape returned for every tool invocation.

use rmcp::model::{CallToolResult, Content};
use serde::{Deserialize, Serialize};

use crate::error::McpError;

/// One item of envelope content. Only text is produced by this server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentItem {
    Text { text: String },
}

impl ContentItem {
    pub fn text(text: impl Into<String>) -> Self {
        ContentItem::Text { text: text.into() }
    }

    pub fn as_text(&self) -> &str {
        match self {
            ContentItem::Text { text } => text,
        }
    }
}

/// `{content: [{type: "text", text}], isError}`.
///
/// An error envelope always carries a human-readable diagnostic, never a
/// serialized internal error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub content: Vec<ContentItem>,
    #[serde(default)]
    pub is_error: bool,
}

impl ResponseEnvelope {
    /// Successful single-text response.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentItem::text(text)],
            is_error: false,
        }
    }

    /// Error response with the message used verbatim.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ContentItem::text(message)],
            is_error: true,
        }
    }

    /// Error response for a failure caught at the dispatch boundary: `"Error: <message>"`.
    pub fn from_error(err: &McpError) -> Self {
        Self::error(format!("Error: {}", err))
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }

    /// All text items joined with newlines.
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .map(ContentItem::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<ResponseEnvelope> for CallToolResult {
    fn from(envelope: ResponseEnvelope) -> Self {
        let content: Vec<Content> = envelope
            .content
            .into_iter()
            .map(|item| match item {
                ContentItem::Text { text } => Content::text(text),
            })
            .collect();

        if envelope.is_error {
            CallToolResult::error(content)
        } else {
            CallToolResult::success(content)
        }
    }
}
