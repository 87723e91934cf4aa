//! Name-indexed registry of tool families.
//!
//! Built once at startup and never mutated afterwards, so lookups need no
//! locking. Listing order is family registration order, then each family's own
//! declaration order.

use std::collections::HashMap;

use rmcp::model::Tool;
use tracing::{debug, warn};

use super::types::{SharedToolFamily, ToolDescriptor};
use crate::error::{McpError, McpResult};

struct Route {
    family: usize,
    descriptor: ToolDescriptor,
}

/// A tool name resolved to its owning family.
pub struct ResolvedTool<'a> {
    pub family: &'a SharedToolFamily,
    pub descriptor: &'a ToolDescriptor,
}

pub struct ToolRegistry {
    families: Vec<SharedToolFamily>,
    order: Vec<String>,
    routes: HashMap<String, Route>,
}

impl ToolRegistry {
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    /// Look up a tool by exact name.
    pub fn resolve(&self, tool_name: &str) -> Option<ResolvedTool<'_>> {
        let route = self.routes.get(tool_name)?;
        Some(ResolvedTool {
            family: &self.families[route.family],
            descriptor: &route.descriptor,
        })
    }

    pub fn has_tool(&self, tool_name: &str) -> bool {
        self.routes.contains_key(tool_name)
    }

    /// All descriptors in listing order.
    pub fn descriptors(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.order
            .iter()
            .filter_map(|name| self.routes.get(name).map(|r| &r.descriptor))
    }

    pub fn list_tools(&self) -> Vec<Tool> {
        self.descriptors().map(ToolDescriptor::to_rmcp).collect()
    }

    pub fn family_names(&self) -> Vec<&'static str> {
        self.families.iter().map(|f| f.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[derive(Default)]
pub struct ToolRegistryBuilder {
    families: Vec<SharedToolFamily>,
}

impl ToolRegistryBuilder {
    #[must_use]
    pub fn family(mut self, family: SharedToolFamily) -> Self {
        self.families.push(family);
        self
    }

    /// Index every family's tools. Fails if two tools share a name.
    pub fn build(self) -> McpResult<ToolRegistry> {
        let mut order = Vec::new();
        let mut routes: HashMap<String, Route> = HashMap::new();

        for (idx, family) in self.families.iter().enumerate() {
            for descriptor in family.tools() {
                if !descriptor.name.starts_with(family.prefix()) {
                    warn!(
                        family = family.name(),
                        tool = %descriptor.name,
                        prefix = family.prefix(),
                        "Tool name does not carry its family prefix"
                    );
                }

                if let Some(existing) = routes.get(&descriptor.name) {
                    return Err(McpError::DuplicateTool {
                        tool_name: descriptor.name.clone(),
                        families: vec![
                            self.families[existing.family].name().to_string(),
                            family.name().to_string(),
                        ],
                    });
                }

                order.push(descriptor.name.clone());
                routes.insert(
                    descriptor.name.clone(),
                    Route {
                        family: idx,
                        descriptor,
                    },
                );
            }
            debug!(family = family.name(), "Registered tool family");
        }

        Ok(ToolRegistry {
            families: self.families,
            order,
            routes,
        })
    }
}
