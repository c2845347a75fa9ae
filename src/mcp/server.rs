//! MCP server implementation.
//!
//! Exposes 18 Prometheus tools that any MCP client can invoke to query
//! metrics and inspect a Prometheus server. Tool listing and dispatch are
//! driven by the registry so the configured preset decides what is visible.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, JsonObject, ListToolsResult,
    PaginatedRequestParams, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{ErrorData as McpError, ServerHandler, ServiceExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::preset::enabled_categories;
use crate::config::schema::ServerConfig;
use crate::error::{PrometheusError, ToolError};
use crate::observability::redact_secrets;
use crate::prometheus::{client_from_params, AuthMode, PrometheusClient};

use super::format::limit_output;
use super::params::ToolArgs;
use super::registry::{self, ToolSpec};
use super::{tools_admin, tools_alerting, tools_discovery, tools_query};

// ---------------------------------------------------------------------------
// Server struct
// ---------------------------------------------------------------------------

/// Prometheus MCP server.
///
/// Cheap to clone: the config sits behind `Arc<Mutex<>>` and the HTTP
/// client is an internally pooled handle, so every transport session can
/// hold its own copy.
#[derive(Clone)]
pub struct PrometheusServer {
    config: Arc<Mutex<ServerConfig>>,
    http: reqwest::Client,
}

impl std::fmt::Debug for PrometheusServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let config = self.config_snapshot();
        f.debug_struct("PrometheusServer")
            .field("preset", &config.preset)
            .field("url", &config.prometheus.url)
            .field("auth", &AuthMode::for_config(&config.prometheus))
            .finish()
    }
}

impl PrometheusServer {
    /// Create a server with its own pooled HTTP client.
    pub fn new(config: ServerConfig) -> Result<Self, PrometheusError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("mcp-prometheus/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_http_client(config, http))
    }

    pub fn with_http_client(config: ServerConfig, http: reqwest::Client) -> Self {
        Self {
            config: Arc::new(Mutex::new(config)),
            http,
        }
    }

    /// A copy of the current config, so no lock is held across an await.
    pub fn config_snapshot(&self) -> ServerConfig {
        self.config
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Tools visible under the current preset, in registry order.
    pub fn enabled_tools(&self) -> Vec<Tool> {
        let enabled = registry::enabled_tool_names(&self.config_snapshot());
        registry::all_tools()
            .iter()
            .filter(|t| enabled.contains(t.name))
            .map(ToolSpec::to_tool)
            .collect()
    }

    /// Run one tool call to completion. Never fails: every problem becomes
    /// an error result whose text is safe to show the client.
    pub async fn dispatch(&self, name: &str, arguments: Option<&JsonObject>) -> CallToolResult {
        let started = Instant::now();
        match self.execute(name, arguments).await {
            Ok(text) => {
                debug!(
                    tool = name,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    bytes = text.len(),
                    "Tool call succeeded"
                );
                CallToolResult::success(vec![Content::text(text)])
            }
            Err(e) => {
                let message = redact_secrets(&e.to_string());
                warn!(tool = name, error = %message, "Tool call failed");
                CallToolResult::error(vec![Content::text(message)])
            }
        }
    }

    /// Like [`dispatch`](Self::dispatch), but abandons the in-flight request
    /// and returns an error result once `ct` is cancelled.
    pub async fn dispatch_with_cancel(
        &self,
        name: &str,
        arguments: Option<&JsonObject>,
        ct: CancellationToken,
    ) -> CallToolResult {
        tokio::select! {
            result = self.dispatch(name, arguments) => result,
            _ = ct.cancelled() => {
                info!(tool = %name, "Tool call cancelled by client");
                CallToolResult::error(vec![Content::text(format!(
                    "Tool call '{name}' was cancelled"
                ))])
            }
        }
    }

    async fn execute(&self, name: &str, arguments: Option<&JsonObject>) -> Result<String, ToolError> {
        let config = self.config_snapshot();
        let spec =
            registry::find_tool(name).ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        if !registry::enabled_tool_names(&config).contains(spec.name) {
            return Err(not_enabled(&config, spec));
        }

        let args = ToolArgs::new(arguments);
        let client = client_from_params(
            &self.http,
            &config.prometheus,
            args.prometheus_url().as_deref(),
            args.org_id().as_deref(),
        )
        .map_err(ToolError::Client)?;

        let text = run_tool(spec.name, &client, args).await?;
        Ok(limit_output(text, args.unlimited()))
    }
}

/// Explain why `spec` is hidden: outside the preset, category toggled off,
/// or overridden off.
fn not_enabled(config: &ServerConfig, spec: &ToolSpec) -> ToolError {
    let name = spec.name.to_string();
    if !enabled_categories(&config.preset).contains(spec.category) {
        return ToolError::NotEnabled {
            name,
            preset: config.preset.to_string(),
        };
    }
    let reason = if !config.is_category_enabled(spec.category) {
        format!("category '{}' is turned off", spec.category)
    } else {
        config
            .tools
            .overrides
            .get(spec.name)
            .and_then(|o| o.reason.clone())
            .unwrap_or_else(|| "turned off by a tool override".to_string())
    };
    ToolError::Disabled { name, reason }
}

async fn run_tool(
    name: &str,
    client: &PrometheusClient,
    args: ToolArgs<'_>,
) -> Result<String, ToolError> {
    match name {
        "execute_query" => tools_query::handle_execute_query(client, args).await,
        "execute_range_query" => tools_query::handle_execute_range_query(client, args).await,
        "query_exemplars" => tools_query::handle_query_exemplars(client, args).await,
        "list_metrics" => tools_discovery::handle_list_metrics(client, args).await,
        "get_metric_metadata" => tools_discovery::handle_get_metric_metadata(client, args).await,
        "list_label_names" => tools_discovery::handle_list_label_names(client, args).await,
        "list_label_values" => tools_discovery::handle_list_label_values(client, args).await,
        "find_series" => tools_discovery::handle_find_series(client, args).await,
        "get_targets_metadata" => tools_discovery::handle_get_targets_metadata(client, args).await,
        "get_alerts" => tools_alerting::handle_get_alerts(client).await,
        "get_alertmanagers" => tools_alerting::handle_get_alertmanagers(client).await,
        "get_rules" => tools_alerting::handle_get_rules(client).await,
        "get_targets" => tools_admin::handle_get_targets(client).await,
        "get_build_info" => tools_admin::handle_get_build_info(client).await,
        "get_runtime_info" => tools_admin::handle_get_runtime_info(client).await,
        "get_flags" => tools_admin::handle_get_flags(client).await,
        "get_config" => tools_admin::handle_get_config(client).await,
        "get_tsdb_stats" => tools_admin::handle_get_tsdb_stats(client, args).await,
        other => Err(ToolError::UnknownTool(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// ServerHandler impl: manual list_tools/call_tool over the registry
// ---------------------------------------------------------------------------

impl ServerHandler for PrometheusServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Prometheus MCP server. Run PromQL with execute_query/execute_range_query, \
                 discover metrics with list_metrics, list_label_names, list_label_values and \
                 find_series, and inspect targets, alerts, rules and TSDB stats. Large results \
                 are truncated unless \"unlimited\": \"true\" is passed."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: rmcp::model::Implementation {
                name: "mcp-prometheus".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        std::future::ready(Ok(ListToolsResult {
            meta: None,
            next_cursor: None,
            tools: self.enabled_tools(),
        }))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self
            .dispatch_with_cancel(&request.name, request.arguments.as_ref(), context.ct.clone())
            .await)
    }
}

// ---------------------------------------------------------------------------
// Public entry point: run the MCP server over stdio
// ---------------------------------------------------------------------------

/// Serve MCP on stdin/stdout until the client disconnects.
pub async fn run_stdio(server: PrometheusServer) -> anyhow::Result<()> {
    info!("Starting MCP server on stdio");
    let transport = rmcp::transport::io::stdio();
    let running = server.serve(transport).await.inspect_err(|e| {
        tracing::error!("MCP server error: {}", e);
    })?;
    let _ = running.waiting().await;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
