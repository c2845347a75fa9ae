//! Admin tool handlers (6 tools).
//!
//! Contains the logic for: get_targets, get_build_info, get_runtime_info,
//! get_flags, get_config, and get_tsdb_stats.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{upstream, ToolError};
use crate::prometheus::PrometheusClient;

use super::format::json_text;
use super::params::ToolArgs;

/// Fields kept from each active target.
const ACTIVE_TARGET_FIELDS: &[&str] = &[
    "discoveredLabels",
    "labels",
    "scrapePool",
    "scrapeUrl",
    "globalUrl",
    "lastError",
    "lastScrape",
    "lastScrapeDuration",
    "health",
];

const DROPPED_TARGET_FIELDS: &[&str] = &["discoveredLabels"];

fn project(targets: &[Value], fields: &[&str]) -> Value {
    targets
        .iter()
        .map(|t| {
            let kept: Map<String, Value> = fields
                .iter()
                .filter_map(|f| t.get(*f).map(|v| (f.to_string(), v.clone())))
                .collect();
            Value::Object(kept)
        })
        .collect()
}

// 13. get_targets
pub async fn handle_get_targets(client: &PrometheusClient) -> Result<String, ToolError> {
    debug!("Getting targets");
    let resp = client.targets().await.map_err(upstream("getting targets"))?;
    let targets = resp.data;
    Ok(format!(
        "Targets information:\nActive targets: {}\nDropped targets: {}\n\nActive Targets: {}\nDropped Targets: {}",
        targets.active_targets.len(),
        targets.dropped_targets.len(),
        json_text(&project(&targets.active_targets, ACTIVE_TARGET_FIELDS)),
        json_text(&project(&targets.dropped_targets, DROPPED_TARGET_FIELDS)),
    ))
}

// 14. get_build_info
pub async fn handle_get_build_info(client: &PrometheusClient) -> Result<String, ToolError> {
    debug!("Getting build info");
    let resp = client
        .build_info()
        .await
        .map_err(upstream("getting build info"))?;
    Ok(format!("Prometheus Build Information:\n{}", json_text(&resp.data)))
}

// 15. get_runtime_info
pub async fn handle_get_runtime_info(client: &PrometheusClient) -> Result<String, ToolError> {
    debug!("Getting runtime info");
    let resp = client
        .runtime_info()
        .await
        .map_err(upstream("getting runtime info"))?;
    Ok(format!("Prometheus Runtime Information:\n{}", json_text(&resp.data)))
}

// 16. get_flags
pub async fn handle_get_flags(client: &PrometheusClient) -> Result<String, ToolError> {
    debug!("Getting flags");
    let resp = client.flags().await.map_err(upstream("getting flags"))?;
    Ok(format!("Prometheus Runtime Flags:\n{}", json_text(&resp.data)))
}

// 17. get_config
pub async fn handle_get_config(client: &PrometheusClient) -> Result<String, ToolError> {
    debug!("Getting config");
    let resp = client
        .status_config()
        .await
        .map_err(upstream("getting config"))?;
    Ok(format!("Prometheus Configuration:\n{}", resp.data.yaml))
}

// 18. get_tsdb_stats
pub async fn handle_get_tsdb_stats(
    client: &PrometheusClient,
    args: ToolArgs<'_>,
) -> Result<String, ToolError> {
    let limit = args.optional_str("limit");
    debug!(limit = ?limit, "Getting TSDB stats");
    let resp = client
        .tsdb_stats(limit.as_deref())
        .await
        .map_err(upstream("getting TSDB stats"))?;
    Ok(format!("TSDB Statistics:\n{}", json_text(&resp.data)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn projection_keeps_listed_fields_only() {
        let targets = vec![json!({
            "labels": {"job": "node"},
            "scrapeUrl": "http://node:9100/metrics",
            "health": "up",
            "scrapeInterval": "15s",
        })];
        let projected = project(&targets, ACTIVE_TARGET_FIELDS);
        assert_eq!(
            projected,
            json!([{
                "labels": {"job": "node"},
                "scrapeUrl": "http://node:9100/metrics",
                "health": "up",
            }])
        );
    }

    #[test]
    fn dropped_targets_keep_discovered_labels() {
        let targets = vec![json!({"discoveredLabels": {"__address__": "x"}, "other": 1})];
        assert_eq!(
            project(&targets, DROPPED_TARGET_FIELDS),
            json!([{"discoveredLabels": {"__address__": "x"}}])
        );
    }
}
