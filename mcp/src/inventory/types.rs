//! Core types for the tool registry.

use std::{borrow::Cow, sync::Arc};

use async_trait::async_trait;
use rmcp::model::Tool;

use crate::{
    annotations::ToolAnnotations, envelope::ResponseEnvelope, error::McpResult, schema::Schema,
    validation::ValidatedArgs,
};

/// Static description of one tool: what the host sees in `tools/list` and what
/// the dispatcher validates arguments against.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Schema,
    pub annotations: ToolAnnotations,
}

impl ToolDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: impl Into<Schema>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: input_schema.into(),
            annotations: ToolAnnotations::default(),
        }
    }

    #[must_use]
    pub fn with_annotations(mut self, annotations: ToolAnnotations) -> Self {
        self.annotations = annotations;
        self
    }

    /// Render as the protocol-level tool definition.
    pub fn to_rmcp(&self) -> Tool {
        Tool {
            name: Cow::Owned(self.name.clone()),
            title: None,
            description: Some(Cow::Owned(self.description.clone())),
            input_schema: Arc::new(self.input_schema.to_json_schema()),
            output_schema: None,
            annotations: Some(self.annotations.to_rmcp()),
            icons: None,
        }
    }
}

/// A group of related tools backed by one area of the remote API.
///
/// Families are registered once at startup. `call` only ever receives names the
/// family itself listed in [`tools`](ToolFamily::tools), with arguments already
/// validated against that tool's schema.
#[async_trait]
pub trait ToolFamily: Send + Sync {
    /// Short family label used in logs, e.g. `"page"`.
    fn name(&self) -> &'static str;

    /// Name prefix every tool in this family carries, e.g. `"notion_"`.
    fn prefix(&self) -> &'static str;

    /// Tool descriptors in listing order.
    fn tools(&self) -> Vec<ToolDescriptor>;

    async fn call(&self, tool: &str, args: ValidatedArgs) -> McpResult<ResponseEnvelope>;
}

pub type SharedToolFamily = Arc<dyn ToolFamily>;
