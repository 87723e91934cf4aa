//! Error taxonomy for tool dispatch.
//!
//! Three user-visible failure kinds cross the dispatch boundary: validation,
//! remote, and routing. Everything is converted into an error
//! [`ResponseEnvelope`](crate::envelope::ResponseEnvelope) by the dispatcher;
//! none of these types ever reaches the protocol host directly.

use std::{fmt, time::Duration};

use thiserror::Error;

pub type McpResult<T> = Result<T, McpError>;

#[derive(Debug, Error)]
pub enum McpError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Tool name collision: '{tool_name}' declared by families {families:?}")]
    DuplicateTool {
        tool_name: String,
        families: Vec<String>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl McpError {
    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> FailureKind {
        match self {
            McpError::Validation(_) => FailureKind::Validation,
            McpError::Remote(_) => FailureKind::Remote,
            McpError::UnknownTool(_) => FailureKind::Routing,
            McpError::DuplicateTool { .. } | McpError::Config(_) | McpError::Internal(_) => {
                FailureKind::Internal
            }
        }
    }
}

/// Coarse failure category, one per metrics bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Validation,
    Remote,
    Routing,
    Setup,
    Internal,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::Validation => "validation",
            FailureKind::Remote => "remote",
            FailureKind::Routing => "routing",
            FailureKind::Setup => "setup",
            FailureKind::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// Argument validation failure, carrying the offending field path.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Invalid arguments: {kind}{}", fmt_path(.path))]
pub struct ValidationError {
    /// Dotted path to the field, empty for the argument object itself.
    pub path: String,
    pub kind: ValidationErrorKind,
}

fn fmt_path(path: &str) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!(" (at '{}')", path)
    }
}

impl ValidationError {
    pub fn new(path: impl Into<String>, kind: ValidationErrorKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn missing(path: impl Into<String>) -> Self {
        let path = path.into();
        let field = path.rsplit('.').next().unwrap_or_default().to_string();
        Self::new(path, ValidationErrorKind::MissingField { field })
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationErrorKind {
    #[error("missing required field '{field}'")]
    MissingField { field: String },

    #[error("expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("value '{value}' is not one of [{}]", .allowed.join(", "))]
    NotInEnum { value: String, allowed: Vec<String> },

    #[error("value {value} is outside the range {}", fmt_range(.min, .max))]
    OutOfRange {
        value: f64,
        min: Option<f64>,
        max: Option<f64>,
    },
}

fn fmt_range(min: &Option<f64>, max: &Option<f64>) -> String {
    match (*min, *max) {
        (Some(lo), Some(hi)) => format!("[{}, {}]", lo, hi),
        (Some(lo), None) => format!(">= {}", lo),
        (None, Some(hi)) => format!("<= {}", hi),
        (None, None) => "(unbounded)".to_string(),
    }
}

/// Failure reported by the remote API layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// Distinguished rate-limit signal; absorbed by one retry in
    /// [`RateLimitedExecutor`](crate::rate_limit::RateLimitedExecutor).
    #[error("Rate limited: {message}")]
    RateLimited {
        retry_after: Option<Duration>,
        message: String,
    },

    #[error("{message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Rejected before sending, e.g. an id that is not a single path segment.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl RemoteError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, RemoteError::RateLimited { .. })
    }

    /// Advised wait carried by a rate-limit signal, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            RemoteError::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_tool_message() {
        let err = McpError::UnknownTool("notion_nope".to_string());
        assert_eq!(err.to_string(), "Unknown tool: notion_nope");
        assert_eq!(err.kind(), FailureKind::Routing);
    }

    #[test]
    fn test_validation_message_names_field() {
        let err = ValidationError::missing("sorts.0.property");
        assert_eq!(
            err.to_string(),
            "Invalid arguments: missing required field 'property' (at 'sorts.0.property')"
        );
    }

    #[test]
    fn test_enum_message_lists_allowed_set() {
        let err = ValidationError::new(
            "direction",
            ValidationErrorKind::NotInEnum {
                value: "sideways".to_string(),
                allowed: vec!["ascending".to_string(), "descending".to_string()],
            },
        );
        assert!(err
            .to_string()
            .contains("'sideways' is not one of [ascending, descending]"));
    }

    #[test]
    fn test_range_message() {
        let kind = ValidationErrorKind::OutOfRange {
            value: 500.0,
            min: Some(1.0),
            max: Some(100.0),
        };
        assert_eq!(kind.to_string(), "value 500 is outside the range [1, 100]");
    }

    #[test]
    fn test_remote_error_passthrough_message() {
        let err: McpError = RemoteError::Api {
            status: 404,
            code: "object_not_found".to_string(),
            message: "Could not find page".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Could not find page");
        assert_eq!(err.kind(), FailureKind::Remote);
    }

    #[test]
    fn test_retry_after_only_on_rate_limit() {
        let limited = RemoteError::RateLimited {
            retry_after: Some(Duration::from_secs(2)),
            message: "slow down".to_string(),
        };
        assert!(limited.is_rate_limited());
        assert_eq!(limited.retry_after(), Some(Duration::from_secs(2)));

        let transport = RemoteError::Transport("reset".to_string());
        assert!(!transport.is_rate_limited());
        assert_eq!(transport.retry_after(), None);
    }
}
