//! Query tool handlers (3 tools).
//!
//! Contains the logic for: execute_query, execute_range_query, and
//! query_exemplars.

use tracing::debug;

use crate::error::{upstream, ToolError};
use crate::prometheus::PrometheusClient;

use super::format::{format_query_result, json_text};
use super::params::ToolArgs;

// 1. execute_query
pub async fn handle_execute_query(
    client: &PrometheusClient,
    args: ToolArgs<'_>,
) -> Result<String, ToolError> {
    let query = args.required_str("query")?;
    let time = args.optional_str("time");
    let options = args.query_options();
    debug!(query, time = ?time, options = ?options, unlimited = args.unlimited(), "Executing PromQL query");

    let resp = client
        .query(query, time.as_deref(), &options)
        .await
        .map_err(upstream("executing query"))?;
    Ok(format_query_result(&resp.data.result_type, &resp.data.result))
}

// 2. execute_range_query
pub async fn handle_execute_range_query(
    client: &PrometheusClient,
    args: ToolArgs<'_>,
) -> Result<String, ToolError> {
    let query = args.required_str("query")?;
    let start = args.required_str("start")?;
    let end = args.required_str("end")?;
    let step = args.required_str("step")?;
    let options = args.query_options();
    debug!(query, start, end, step, options = ?options, "Executing PromQL range query");

    let resp = client
        .query_range(query, start, end, step, &options)
        .await
        .map_err(upstream("executing range query"))?;
    Ok(format_query_result(&resp.data.result_type, &resp.data.result))
}

// 3. query_exemplars
pub async fn handle_query_exemplars(
    client: &PrometheusClient,
    args: ToolArgs<'_>,
) -> Result<String, ToolError> {
    let query = args.required_str("query")?;
    let start = args.required_str("start")?;
    let end = args.required_str("end")?;
    debug!(query, start, end, "Querying exemplars");

    let resp = client
        .query_exemplars(query, start, end)
        .await
        .map_err(upstream("querying exemplars"))?;
    Ok(format!(
        "Exemplars for query '{}':\n{}",
        query,
        json_text(&resp.data)
    ))
}
