use std::sync::Arc;

use clap::Parser;
use notion_mcp::{
    logging::init_logging,
    notion::NotionClient,
    tools::{build_registry, setup_notice},
    Cli, NotionMcpServer,
};
use notion_mcp_core::{DispatchMetrics, Dispatcher, RateLimitedExecutor, ServerLifecycle};
use rmcp::{transport::stdio, ServiceExt};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Cli::parse().into_config();
    init_logging(&config.logging)?;

    let metrics = Arc::new(DispatchMetrics::new());
    let executor = RateLimitedExecutor::new()
        .with_fallback_wait(config.notion.rate_limit_fallback)
        .with_metrics(Arc::clone(&metrics));

    let lifecycle = match ServerLifecycle::initialize(config.api_key, setup_notice(), |key| {
        NotionClient::new(&config.notion, &key, executor)
            .map(Arc::new)
            .and_then(build_registry)
    }) {
        Ok(lifecycle) => lifecycle,
        Err(e) => {
            error!(error = %e, "Failed to start server");
            std::process::exit(1);
        }
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        mode = if lifecycle.is_ready() { "ready" } else { "setup-required" },
        base_url = %config.notion.base_url,
        api_version = %config.notion.api_version,
        "Starting Notion MCP server on stdio"
    );

    let dispatcher = Arc::new(Dispatcher::new(lifecycle).with_metrics(Arc::clone(&metrics)));
    let service = NotionMcpServer::new(dispatcher).serve(stdio()).await?;

    tokio::select! {
        result = service.waiting() => {
            if let Err(e) = result {
                error!(error = %e, "MCP service stopped with an error");
            }
        }
        _ = shutdown_signal() => {}
    }

    let snapshot = metrics.snapshot();
    info!(
        total_calls = snapshot.total_calls,
        failed_calls = snapshot.failed_calls,
        rate_limit_retries = snapshot.rate_limit_retries,
        success_rate = format_args!("{:.1}%", snapshot.success_rate()),
        "Shutting down"
    );
    for (tool, latency) in metrics.all_tool_latencies() {
        info!(
            tool = %tool,
            calls = latency.count,
            avg_ms = latency.avg_ms,
            min_ms = latency.min_ms,
            max_ms = latency.max_ms,
            "Tool latency"
        );
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
