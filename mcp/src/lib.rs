//! Tool-dispatch core for a Model Context Protocol server.
//!
//! ## Modules
//!
//! - [`inventory`]: tool families, descriptors, and the name-indexed registry
//! - [`validation`]: argument checking against a tool's [`Schema`]
//! - [`dispatch`]: the single call boundary that turns every outcome into a
//!   [`ResponseEnvelope`]
//! - [`rate_limit`]: one-shot retry for rate-limited remote calls
//! - [`lifecycle`]: ready vs. setup-required server state
//!
//! Nothing here knows about a particular remote API; concrete tool families
//! live in the server crate.

// Shared types
pub mod annotations;
pub mod envelope;
pub mod error;
pub mod schema;

// Subsystems
pub mod dispatch;
pub mod inventory;
pub mod lifecycle;
pub mod metrics;
pub mod rate_limit;
pub mod validation;

pub use annotations::ToolAnnotations;
pub use dispatch::Dispatcher;
pub use envelope::{ContentItem, ResponseEnvelope};
pub use error::{
    FailureKind, McpError, McpResult, RemoteError, ValidationError, ValidationErrorKind,
};
pub use inventory::{
    ResolvedTool, SharedToolFamily, ToolDescriptor, ToolFamily, ToolRegistry, ToolRegistryBuilder,
};
pub use lifecycle::{ServerLifecycle, SetupNotice};
pub use metrics::{DispatchMetrics, LatencySnapshot, MetricsSnapshot};
pub use rate_limit::{RateLimitedExecutor, DEFAULT_RATE_LIMIT_WAIT};
pub use schema::{ObjectSchema, Schema, SchemaKind};
pub use validation::{validate, ValidatedArgs};
