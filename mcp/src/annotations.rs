//! Behavior hints advertised alongside each tool.
//!
//! Kept as plain `bool`s here and converted to rmcp's `Option<bool>` hints only
//! when a tool list is rendered for the host.

use rmcp::model::ToolAnnotations as RmcpToolAnnotations;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolAnnotations {
    pub title: Option<String>,
    pub read_only: bool,
    pub destructive: bool,
    pub idempotent: bool,
    pub open_world: bool,
}

impl ToolAnnotations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only remote lookup.
    pub fn read() -> Self {
        Self {
            read_only: true,
            idempotent: true,
            open_world: true,
            ..Self::default()
        }
    }

    /// Remote mutation that adds or edits content.
    pub fn write() -> Self {
        Self {
            open_world: true,
            ..Self::default()
        }
    }

    /// Remote mutation that archives or removes content.
    pub fn delete() -> Self {
        Self {
            destructive: true,
            idempotent: true,
            open_world: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_idempotent(mut self, v: bool) -> Self {
        self.idempotent = v;
        self
    }

    pub fn to_rmcp(&self) -> RmcpToolAnnotations {
        RmcpToolAnnotations {
            title: self.title.clone(),
            read_only_hint: Some(self.read_only),
            destructive_hint: Some(self.destructive),
            idempotent_hint: Some(self.idempotent),
            open_world_hint: Some(self.open_world),
        }
    }
}
