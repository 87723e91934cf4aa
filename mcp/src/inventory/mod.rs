//! Tool registry: families, descriptors, and name lookup.

pub mod index;
pub mod types;

pub use index::{ResolvedTool, ToolRegistry, ToolRegistryBuilder};
pub use types::{SharedToolFamily, ToolDescriptor, ToolFamily};
