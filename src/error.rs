//! Error types for the Prometheus client, tool calls, and config loading.
//!
//! None of these are process-fatal once the server is running: tool handlers
//! render them into error `CallToolResult`s. Only [`ConfigError`] can abort
//! startup.

use std::path::PathBuf;

/// Failures talking to (or preparing a request for) a Prometheus server.
#[derive(Debug, thiserror::Error)]
pub enum PrometheusError {
    #[error(
        "prometheus URL is required: either set PROMETHEUS_URL environment variable or provide prometheus_url parameter"
    )]
    MissingUrl,

    #[error("invalid Prometheus URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid time parameter '{0}': expected RFC3339 or Unix timestamp")]
    InvalidTime(String),

    #[error("invalid duration '{0}': expected a Prometheus duration like '30s', '5m', '1h30m' or float seconds")]
    InvalidDuration(String),

    #[error("invalid limit '{0}': expected a non-negative integer")]
    InvalidLimit(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("{error_type}: {message}")]
    Api { error_type: String, message: String },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A required tool parameter was missing or had the wrong type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParamError {
    #[error("{0} parameter is required and must be a string")]
    MissingString(&'static str),

    #[error("{0} parameter is required and must be an array of strings")]
    MissingArray(&'static str),
}

/// Why a tool call produced an error result. `Display` is the exact text
/// returned to the client (before secret redaction).
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Tool '{name}' is not available in the current preset ({preset}). Change the preset in the config file or set MCP_PROMETHEUS_PRESET=full to enable all tools.")]
    NotEnabled { name: String, preset: String },

    #[error("Tool '{name}' is disabled in the config file: {reason}")]
    Disabled { name: String, reason: String },

    #[error("Error: {0}")]
    Param(#[from] ParamError),

    #[error("Error creating Prometheus client: {0}")]
    Client(#[source] PrometheusError),

    #[error("Error {action}: {source}")]
    Upstream {
        action: String,
        #[source]
        source: PrometheusError,
    },
}

/// `map_err` adapter for failed Prometheus calls.
pub(crate) fn upstream(action: impl Into<String>) -> impl FnOnce(PrometheusError) -> ToolError {
    let action = action.into();
    move |source| ToolError::Upstream { action, source }
}

/// Config file could not be read or parsed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("unknown preset '{0}' (expected minimal, standard, or full)")]
    UnknownPreset(String),
}
