//! Server readiness, decided once at startup.
//!
//! With a credential the server is `Ready` and serves the full registry.
//! Without one it starts `Degraded`: it stays up, lists a single setup tool, and
//! answers every call with setup instructions. The state never changes after
//! [`ServerLifecycle::initialize`].

use std::sync::Arc;

use rmcp::model::Tool;
use tracing::{info, warn};

use crate::{
    annotations::ToolAnnotations,
    error::McpResult,
    inventory::{ToolDescriptor, ToolRegistry},
    schema::Schema,
};

/// What a degraded server tells the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupNotice {
    /// Name of the sentinel tool listed in place of the real ones.
    pub tool_name: String,
    /// Sentinel tool description.
    pub description: String,
    /// Text returned for every call while degraded.
    pub message: String,
}

impl SetupNotice {
    pub fn new(
        tool_name: impl Into<String>,
        description: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            tool_name: tool_name.into(),
            description: description.into(),
            message: message.into(),
        }
    }

    /// The sentinel tool: no parameters, no behavior of its own.
    pub fn sentinel(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            self.tool_name.clone(),
            self.description.clone(),
            Schema::empty_object(),
        )
        .with_annotations(ToolAnnotations::new().with_title("Setup required"))
    }
}

#[derive(Clone)]
pub enum ServerLifecycle {
    Ready(Arc<ToolRegistry>),
    Degraded(SetupNotice),
}

impl ServerLifecycle {
    /// Decide the server state from the configured credential.
    ///
    /// `build` runs only when a credential is present; an error from it is a
    /// startup fault, not a reason to degrade.
    pub fn initialize<C, F>(credential: Option<C>, notice: SetupNotice, build: F) -> McpResult<Self>
    where
        F: FnOnce(C) -> McpResult<ToolRegistry>,
    {
        match credential {
            Some(credential) => {
                let registry = build(credential)?;
                if registry.is_empty() {
                    warn!("Credential configured but no tools were registered");
                }
                info!(
                    tools = registry.len(),
                    families = ?registry.family_names(),
                    "Server ready"
                );
                Ok(ServerLifecycle::Ready(Arc::new(registry)))
            }
            None => {
                warn!(
                    setup_tool = %notice.tool_name,
                    "No API credential configured, starting in setup-required mode"
                );
                Ok(ServerLifecycle::Degraded(notice))
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ServerLifecycle::Ready(_))
    }

    pub fn list_tools(&self) -> Vec<Tool> {
        match self {
            ServerLifecycle::Ready(registry) => registry.list_tools(),
            ServerLifecycle::Degraded(notice) => vec![notice.sentinel().to_rmcp()],
        }
    }
}
