//! Shared fixtures for tests that run against a mock Notion API.

#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use notion_mcp::{config::NotionConfig, notion::NotionClient, tools::build_registry};
use notion_mcp_core::{DispatchMetrics, Dispatcher, RateLimitedExecutor, ServerLifecycle};
use secrecy::SecretString;
use serde_json::{json, Value};
use wiremock::MockServer;

pub const API_KEY: &str = "secret_test_key";

pub fn notion_config(server: &MockServer) -> NotionConfig {
    NotionConfig {
        base_url: format!("{}/v1", server.uri()),
        request_timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(2),
        rate_limit_fallback: Duration::from_millis(50),
        ..NotionConfig::default()
    }
}

pub fn client_with_metrics(server: &MockServer, metrics: Arc<DispatchMetrics>) -> NotionClient {
    let config = notion_config(server);
    let executor = RateLimitedExecutor::new()
        .with_fallback_wait(config.rate_limit_fallback)
        .with_metrics(metrics);
    NotionClient::new(&config, &SecretString::from(API_KEY.to_string()), executor)
        .expect("client should build")
}

pub fn client(server: &MockServer) -> NotionClient {
    client_with_metrics(server, Arc::new(DispatchMetrics::new()))
}

pub fn dispatcher(server: &MockServer) -> Dispatcher {
    let metrics = Arc::new(DispatchMetrics::new());
    let client = Arc::new(client_with_metrics(server, Arc::clone(&metrics)));
    let registry = build_registry(client).expect("registry should build");
    Dispatcher::new(ServerLifecycle::Ready(Arc::new(registry))).with_metrics(metrics)
}

pub fn page_json(id: &str, title: &str) -> Value {
    json!({
        "object": "page",
        "id": id,
        "url": format!("https://www.notion.so/{}", id),
        "created_time": "2024-03-01T10:00:00.000Z",
        "last_edited_time": "2024-03-02T11:30:00.000Z",
        "parent": {"type": "workspace", "workspace": true},
        "properties": {
            "title": {
                "id": "title",
                "type": "title",
                "title": [{"type": "text", "plain_text": title}]
            }
        }
    })
}

pub fn paragraph_json(id: &str, text: &str) -> Value {
    json!({
        "object": "block",
        "id": id,
        "type": "paragraph",
        "has_children": false,
        "paragraph": {"rich_text": [{"type": "text", "plain_text": text}]}
    })
}

pub fn list_json(results: Vec<Value>) -> Value {
    json!({"object": "list", "results": results, "has_more": false, "next_cursor": null})
}
