//! Notion REST client.
//!
//! Each public method is one remote call, and every call runs through the
//! [`RateLimitedExecutor`], so a rate-limited request is retried once before
//! the failure reaches a tool.

use std::time::Duration;

use notion_mcp_core::{McpError, McpResult, RateLimitedExecutor, RemoteError};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, RETRY_AFTER},
    Method, StatusCode, Url,
};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use super::model::{ApiErrorBody, Block, Database, List, Page, SearchResult};
use crate::config::NotionConfig;

const NOTION_VERSION: &str = "notion-version";

pub struct NotionClient {
    http: reqwest::Client,
    base_url: Url,
    executor: RateLimitedExecutor,
}

impl std::fmt::Debug for NotionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotionClient")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

fn build_request_headers(api_key: &SecretString, api_version: &str) -> McpResult<HeaderMap> {
    let mut headers = HeaderMap::new();

    let mut auth: HeaderValue = format!("Bearer {}", api_key.expose_secret())
        .parse()
        .map_err(|_| McpError::Config("API key is not a valid header value".to_string()))?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);

    headers.insert(
        HeaderName::from_static(NOTION_VERSION),
        api_version
            .parse()
            .map_err(|e| McpError::Config(format!("Notion-Version header: {}", e)))?,
    );

    Ok(headers)
}

impl NotionClient {
    pub fn new(
        config: &NotionConfig,
        api_key: &SecretString,
        executor: RateLimitedExecutor,
    ) -> McpResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| McpError::Config(format!("invalid base URL '{}': {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(McpError::Config(format!(
                "base URL '{}' cannot carry a path",
                config.base_url
            )));
        }

        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .default_headers(build_request_headers(api_key, &config.api_version)?)
            .user_agent(concat!("notion-mcp-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| McpError::Config(format!("build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            executor,
        })
    }

    pub async fn create_page(&self, body: &Value) -> Result<Page, RemoteError> {
        let url = self.endpoint(&["pages"])?;
        self.request("pages.create", Method::POST, url, Some(body))
            .await
    }

    pub async fn retrieve_page(&self, page_id: &str) -> Result<Page, RemoteError> {
        let url = self.endpoint(&["pages", page_id])?;
        self.request("pages.retrieve", Method::GET, url, None).await
    }

    pub async fn update_page(&self, page_id: &str, body: &Value) -> Result<Page, RemoteError> {
        let url = self.endpoint(&["pages", page_id])?;
        self.request("pages.update", Method::PATCH, url, Some(body))
            .await
    }

    pub async fn list_block_children(
        &self,
        block_id: &str,
        page_size: u32,
    ) -> Result<List<Block>, RemoteError> {
        let mut url = self.endpoint(&["blocks", block_id, "children"])?;
        url.query_pairs_mut()
            .append_pair("page_size", &page_size.to_string());
        self.request("blocks.children.list", Method::GET, url, None)
            .await
    }

    pub async fn append_block_children(
        &self,
        block_id: &str,
        children: &[Value],
    ) -> Result<List<Block>, RemoteError> {
        let url = self.endpoint(&["blocks", block_id, "children"])?;
        let body = json!({ "children": children });
        self.request("blocks.children.append", Method::PATCH, url, Some(&body))
            .await
    }

    pub async fn retrieve_block(&self, block_id: &str) -> Result<Block, RemoteError> {
        let url = self.endpoint(&["blocks", block_id])?;
        self.request("blocks.retrieve", Method::GET, url, None).await
    }

    pub async fn update_block(&self, block_id: &str, body: &Value) -> Result<Block, RemoteError> {
        let url = self.endpoint(&["blocks", block_id])?;
        self.request("blocks.update", Method::PATCH, url, Some(body))
            .await
    }

    pub async fn delete_block(&self, block_id: &str) -> Result<Block, RemoteError> {
        let url = self.endpoint(&["blocks", block_id])?;
        self.request("blocks.delete", Method::DELETE, url, None).await
    }

    pub async fn query_database(
        &self,
        database_id: &str,
        body: &Value,
    ) -> Result<List<Page>, RemoteError> {
        let url = self.endpoint(&["databases", database_id, "query"])?;
        self.request("databases.query", Method::POST, url, Some(body))
            .await
    }

    pub async fn retrieve_database(&self, database_id: &str) -> Result<Database, RemoteError> {
        let url = self.endpoint(&["databases", database_id])?;
        self.request("databases.retrieve", Method::GET, url, None)
            .await
    }

    pub async fn search(&self, body: &Value) -> Result<List<SearchResult>, RemoteError> {
        let url = self.endpoint(&["search"])?;
        self.request("search", Method::POST, url, Some(body)).await
    }

    /// Endpoint under the API base. Every segment is percent-encoded as exactly
    /// one path segment, so an id can neither climb the path nor add a query.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        if let Some(bad) = segments
            .iter()
            .find(|s| s.is_empty() || **s == "." || **s == "..")
        {
            return Err(RemoteError::InvalidRequest(format!(
                "'{}' is not a valid Notion id",
                bad
            )));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RemoteError::InvalidRequest("base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn request<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<T, RemoteError> {
        self.executor
            .run(operation, || self.send_once(operation, method.clone(), &url, body))
            .await
    }

    async fn send_once<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        method: Method,
        url: &Url,
        body: Option<&Value>,
    ) -> Result<T, RemoteError> {
        debug!(operation, %method, %url, "Notion request");

        let mut request = self.http.request(method, url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RemoteError::Transport(format!("{}: {}", operation, e)))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| RemoteError::Decode(format!("{}: {}", operation, e)));
        }

        let retry_after = parse_retry_after(response.headers());
        let error_body: ApiErrorBody = response.json().await.unwrap_or_default();
        Err(classify_error(status, retry_after, error_body))
    }
}

/// `Retry-After` in whole seconds. HTTP-date values are not used by Notion.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

fn classify_error(
    status: StatusCode,
    retry_after: Option<Duration>,
    body: ApiErrorBody,
) -> RemoteError {
    if status == StatusCode::TOO_MANY_REQUESTS || body.code == "rate_limited" {
        let message = if body.message.is_empty() {
            "You have been rate limited. Please try again in a few minutes.".to_string()
        } else {
            body.message
        };
        return RemoteError::RateLimited {
            retry_after,
            message,
        };
    }

    let message = if body.message.is_empty() {
        format!("Notion API request failed with status {}", status.as_u16())
    } else {
        body.message
    };
    RemoteError::Api {
        status: status.as_u16(),
        code: body.code,
        message,
    }
}
