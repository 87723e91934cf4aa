//! Tool-call dispatch.
//!
//! [`Dispatcher::dispatch`] is the single boundary between the protocol host
//! and tool handlers. It never returns an error: every failure, including a
//! handler panic, becomes an error [`ResponseEnvelope`] and a log line on
//! stderr.

use std::{any::Any, panic::AssertUnwindSafe, sync::Arc, time::Instant};

use futures::FutureExt;
use rmcp::model::Tool;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::{
    envelope::ResponseEnvelope,
    error::{FailureKind, McpError, McpResult},
    inventory::ToolRegistry,
    lifecycle::ServerLifecycle,
    metrics::DispatchMetrics,
    validation::validate,
};

pub struct Dispatcher {
    lifecycle: ServerLifecycle,
    metrics: Arc<DispatchMetrics>,
}

impl Dispatcher {
    pub fn new(lifecycle: ServerLifecycle) -> Self {
        Self {
            lifecycle,
            metrics: Arc::new(DispatchMetrics::new()),
        }
    }

    /// Share a metrics sink with other components, e.g. the rate-limit executor.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<DispatchMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn lifecycle(&self) -> &ServerLifecycle {
        &self.lifecycle
    }

    pub fn metrics(&self) -> &Arc<DispatchMetrics> {
        &self.metrics
    }

    pub fn list_tools(&self) -> Vec<Tool> {
        self.lifecycle.list_tools()
    }

    /// Route one call and always produce an envelope.
    pub async fn dispatch(&self, tool_name: &str, arguments: Option<&Value>) -> ResponseEnvelope {
        self.metrics.record_call_start();

        let registry = match &self.lifecycle {
            ServerLifecycle::Ready(registry) => registry,
            ServerLifecycle::Degraded(notice) => {
                warn!(tool = tool_name, "Call rejected: setup required");
                self.metrics.record_call_end(Some(FailureKind::Setup));
                return ResponseEnvelope::error(notice.message.clone());
            }
        };

        let started = Instant::now();
        let result = self.route(registry, tool_name, arguments).await;
        if registry.has_tool(tool_name) {
            self.metrics
                .record_latency(tool_name, started.elapsed().as_millis() as u64);
        }

        match result {
            Ok(envelope) => {
                debug!(tool = tool_name, "Tool call succeeded");
                self.metrics.record_call_end(None);
                envelope
            }
            Err(err) => {
                let kind = err.kind();
                match kind {
                    FailureKind::Validation | FailureKind::Routing => {
                        warn!(tool = tool_name, kind = %kind, error = %err, "Tool call rejected")
                    }
                    _ => error!(tool = tool_name, kind = %kind, error = %err, "Tool call failed"),
                }
                self.metrics.record_call_end(Some(kind));
                ResponseEnvelope::from_error(&err)
            }
        }
    }

    async fn route(
        &self,
        registry: &ToolRegistry,
        tool_name: &str,
        arguments: Option<&Value>,
    ) -> McpResult<ResponseEnvelope> {
        let resolved = registry
            .resolve(tool_name)
            .ok_or_else(|| McpError::UnknownTool(tool_name.to_string()))?;

        let args = validate(&resolved.descriptor.input_schema, arguments)?;
        debug!(
            tool = tool_name,
            family = resolved.family.name(),
            "Dispatching tool call"
        );

        AssertUnwindSafe(resolved.family.call(tool_name, args))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(McpError::Internal(panic_message(panic.as_ref()))))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("tool handler panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("tool handler panicked: {}", s)
    } else {
        "tool handler panicked".to_string()
    }
}
