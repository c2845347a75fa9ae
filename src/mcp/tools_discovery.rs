//! Discovery tool handlers (6 tools).
//!
//! Contains the logic for: list_metrics, get_metric_metadata,
//! list_label_names, list_label_values, find_series, and
//! get_targets_metadata. Long lists are capped unless `unlimited` is set.

use tracing::debug;

use crate::error::{upstream, ToolError};
use crate::prometheus::PrometheusClient;

use super::format::{
    append_warnings, format_series, json_text, numbered_list, LABEL_VALUE_CAP, METRIC_LIST_CAP,
    SERIES_CAP,
};
use super::params::ToolArgs;

fn cap(args: &ToolArgs<'_>, limit: usize) -> Option<usize> {
    if args.unlimited() {
        None
    } else {
        Some(limit)
    }
}

// 4. list_metrics
pub async fn handle_list_metrics(
    client: &PrometheusClient,
    args: ToolArgs<'_>,
) -> Result<String, ToolError> {
    let options = args.selector_options();
    debug!(options = ?options, "Listing metrics");

    let resp = client
        .list_metrics(&options)
        .await
        .map_err(upstream("listing metrics"))?;

    let metrics = resp.data;
    let mut out = if metrics.is_empty() {
        "No metrics found".to_string()
    } else {
        format!(
            "Found {} metrics:\n{}",
            metrics.len(),
            numbered_list(&metrics, cap(&args, METRIC_LIST_CAP), "metrics")
        )
    };
    append_warnings(&mut out, &resp.warnings);
    Ok(out)
}

// 5. get_metric_metadata
pub async fn handle_get_metric_metadata(
    client: &PrometheusClient,
    args: ToolArgs<'_>,
) -> Result<String, ToolError> {
    let metric = args.required_str("metric")?;
    let limit = args.optional_str("limit");
    debug!(metric, limit = ?limit, "Getting metric metadata");

    let resp = client
        .metric_metadata(metric, limit.as_deref())
        .await
        .map_err(upstream(format!("getting metadata for metric '{metric}'")))?;
    Ok(format!(
        "Metadata for metric '{}':\n{}",
        metric,
        json_text(&resp.data)
    ))
}

// 6. list_label_names
pub async fn handle_list_label_names(
    client: &PrometheusClient,
    args: ToolArgs<'_>,
) -> Result<String, ToolError> {
    let options = args.selector_options();
    debug!(options = ?options, "Listing label names");

    let resp = client
        .label_names(&options)
        .await
        .map_err(upstream("listing label names"))?;

    let names = resp.data;
    let mut out = if names.is_empty() {
        "No label names found".to_string()
    } else {
        format!(
            "Found {} label names:\n{}",
            names.len(),
            numbered_list(&names, None, "label names")
        )
    };
    append_warnings(&mut out, &resp.warnings);
    Ok(out)
}

// 7. list_label_values
pub async fn handle_list_label_values(
    client: &PrometheusClient,
    args: ToolArgs<'_>,
) -> Result<String, ToolError> {
    let label = args.required_str("label")?;
    let options = args.selector_options();
    debug!(label, options = ?options, "Listing label values");

    let resp = client
        .label_values(label, &options)
        .await
        .map_err(upstream(format!("listing label values for '{label}'")))?;

    let values = resp.data;
    let mut out = if values.is_empty() {
        format!("No values found for label '{label}'")
    } else {
        format!(
            "Found {} values for label '{}':\n{}",
            values.len(),
            label,
            numbered_list(&values, cap(&args, LABEL_VALUE_CAP), "values")
        )
    };
    append_warnings(&mut out, &resp.warnings);
    Ok(out)
}

// 8. find_series
pub async fn handle_find_series(
    client: &PrometheusClient,
    args: ToolArgs<'_>,
) -> Result<String, ToolError> {
    let matches = args.required_array("matches")?;
    let options = crate::prometheus::SelectorOptions {
        matches,
        ..args.selector_options()
    };
    debug!(options = ?options, "Finding series");

    let resp = client
        .series(&options)
        .await
        .map_err(upstream("finding series"))?;

    let series: Vec<String> = resp.data.iter().map(format_series).collect();
    let mut out = if series.is_empty() {
        "No series found matching the given criteria".to_string()
    } else {
        format!(
            "Found {} series:\n{}",
            series.len(),
            numbered_list(&series, cap(&args, SERIES_CAP), "series")
        )
    };
    append_warnings(&mut out, &resp.warnings);
    Ok(out)
}

// 9. get_targets_metadata
pub async fn handle_get_targets_metadata(
    client: &PrometheusClient,
    args: ToolArgs<'_>,
) -> Result<String, ToolError> {
    let match_target = args.optional_str("match_target");
    let metric = args.optional_str("metric");
    let limit = args.optional_str("limit");
    debug!(match_target = ?match_target, metric = ?metric, limit = ?limit, "Getting targets metadata");

    let resp = client
        .targets_metadata(match_target.as_deref(), metric.as_deref(), limit.as_deref())
        .await
        .map_err(upstream("getting targets metadata"))?;
    Ok(format!("Targets Metadata:\n{}", json_text(&resp.data)))
}
