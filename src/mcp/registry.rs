//! Tool declarations and preset-based filtering.
//!
//! Each of the 18 tools is declared once here with its category and
//! parameters. The server renders these into MCP tool schemas and
//! `filter_tools()` decides which are visible for a given config preset.

use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use rmcp::model::{JsonObject, Tool};
use serde_json::{json, Value};

use crate::config::preset::*;
use crate::config::schema::{ServerConfig, ToolMetadata};

// ---------------------------------------------------------------------------
// Declarations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    /// Array of strings.
    Array,
}

#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ParamKind,
    pub required: bool,
}

#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub params: Vec<ParamSpec>,
}

impl ToolSpec {
    pub fn required_params(&self) -> Vec<&'static str> {
        self.params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect()
    }

    /// JSON Schema for the tool's `arguments` object.
    pub fn input_schema(&self) -> JsonObject {
        let mut properties = serde_json::Map::new();
        for p in &self.params {
            let schema = match p.kind {
                ParamKind::String => json!({
                    "type": "string",
                    "description": p.description,
                }),
                ParamKind::Array => json!({
                    "type": "array",
                    "items": { "type": "string" },
                    "description": p.description,
                }),
            };
            properties.insert(p.name.to_string(), schema);
        }

        let mut schema = JsonObject::new();
        schema.insert("type".into(), Value::String("object".into()));
        schema.insert("properties".into(), Value::Object(properties));
        let required = self.required_params();
        if !required.is_empty() {
            schema.insert("required".into(), json!(required));
        }
        schema
    }

    pub fn to_tool(&self) -> Tool {
        Tool::new(self.name, self.description, Arc::new(self.input_schema()))
    }

    pub fn metadata(&self) -> ToolMetadata {
        ToolMetadata {
            name: self.name.to_string(),
            category: self.category.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parameter builders
// ---------------------------------------------------------------------------

fn string(name: &'static str, description: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        description,
        kind: ParamKind::String,
        required: false,
    }
}

fn required(name: &'static str, description: &'static str) -> ParamSpec {
    ParamSpec {
        required: true,
        ..string(name, description)
    }
}

fn array(name: &'static str, description: &'static str, required: bool) -> ParamSpec {
    ParamSpec {
        name,
        description,
        kind: ParamKind::Array,
        required,
    }
}

fn query_options() -> Vec<ParamSpec> {
    vec![
        string("timeout", "Query timeout (e.g., '30s', '1m', '5m')"),
        string("limit", "Maximum number of returned entries"),
        string("stats", "Include query statistics: 'all'"),
        string("lookback_delta", "Query lookback delta (e.g., '5m')"),
    ]
}

fn time_filter() -> Vec<ParamSpec> {
    vec![
        string("start_time", "Start time for filtering (RFC3339 or Unix timestamp)"),
        string("end_time", "End time for filtering (RFC3339 or Unix timestamp)"),
    ]
}

fn label_matchers() -> ParamSpec {
    array("matches", "Array of label matchers to filter series", false)
}

/// Declare a tool. Connection parameters come first and `unlimited` last,
/// on every tool.
fn tool(
    name: &'static str,
    category: &'static str,
    description: &'static str,
    params: Vec<ParamSpec>,
) -> ToolSpec {
    let mut all = vec![
        string(
            "prometheus_url",
            "Prometheus server URL (e.g., 'http://localhost:8080/prometheus'). Ignored when PROMETHEUS_URL is set",
        ),
        string(
            "org_id",
            "Organization ID for multi-tenant Prometheus. Ignored when PROMETHEUS_ORGID is set",
        ),
    ];
    all.extend(params);
    all.push(string(
        "unlimited",
        "Set to 'true' to get unlimited output (WARNING: may be very large and impact performance)",
    ));
    ToolSpec {
        name,
        description,
        category,
        params: all,
    }
}

fn build_registry() -> Vec<ToolSpec> {
    vec![
        // ── Query (3) ─────────────────────────────────────────────
        tool(
            "execute_query",
            CATEGORY_QUERY,
            "Execute a PromQL instant query against Prometheus",
            [
                vec![
                    required("query", "PromQL query string"),
                    string(
                        "time",
                        "Optional RFC3339 or Unix timestamp (default: current time)",
                    ),
                ],
                query_options(),
            ]
            .concat(),
        ),
        tool(
            "execute_range_query",
            CATEGORY_QUERY,
            "Execute a PromQL range query with start time, end time, and step interval",
            [
                vec![
                    required("query", "PromQL query string"),
                    required("start", "Start time as RFC3339 or Unix timestamp"),
                    required("end", "End time as RFC3339 or Unix timestamp"),
                    required("step", "Query resolution step width (e.g., '15s', '1m', '1h')"),
                ],
                query_options(),
            ]
            .concat(),
        ),
        tool(
            "query_exemplars",
            CATEGORY_QUERY,
            "Query exemplars for traces",
            vec![
                required("query", "PromQL query string to find exemplars for"),
                required("start", "Start time as RFC3339 or Unix timestamp"),
                required("end", "End time as RFC3339 or Unix timestamp"),
            ],
        ),
        // ── Discovery (6) ─────────────────────────────────────────
        tool(
            "list_metrics",
            CATEGORY_DISCOVERY,
            "List all available metrics in Prometheus",
            [time_filter(), vec![label_matchers()]].concat(),
        ),
        tool(
            "get_metric_metadata",
            CATEGORY_DISCOVERY,
            "Get metadata for a specific metric",
            vec![
                required("metric", "The name of the metric to retrieve metadata for"),
                string("limit", "Maximum number of metadata entries to return"),
            ],
        ),
        tool(
            "list_label_names",
            CATEGORY_DISCOVERY,
            "Get all available label names",
            [
                time_filter(),
                vec![
                    label_matchers(),
                    string("limit", "Maximum number of label names to return"),
                ],
            ]
            .concat(),
        ),
        tool(
            "list_label_values",
            CATEGORY_DISCOVERY,
            "Get values for a specific label",
            [
                time_filter(),
                vec![
                    label_matchers(),
                    required("label", "The label name to get values for"),
                    string("limit", "Maximum number of label values to return"),
                ],
            ]
            .concat(),
        ),
        tool(
            "find_series",
            CATEGORY_DISCOVERY,
            "Find series by label matchers",
            [
                time_filter(),
                vec![
                    array(
                        "matches",
                        "Array of label matchers (e.g., ['{job=\"prometheus\"}', '{__name__=~\"http_.*\"}'])",
                        true,
                    ),
                    string("limit", "Maximum number of series to return"),
                ],
            ]
            .concat(),
        ),
        tool(
            "get_targets_metadata",
            CATEGORY_DISCOVERY,
            "Get metadata about metrics from specific targets",
            vec![
                string("match_target", "Target matcher to filter targets"),
                string("metric", "Metric name to filter metadata for"),
                string("limit", "Maximum number of metadata entries to return"),
            ],
        ),
        // ── Alerting (3) ──────────────────────────────────────────
        tool("get_alerts", CATEGORY_ALERTING, "Get active alerts", vec![]),
        tool(
            "get_alertmanagers",
            CATEGORY_ALERTING,
            "Get AlertManager discovery information",
            vec![],
        ),
        tool(
            "get_rules",
            CATEGORY_ALERTING,
            "Get recording and alerting rules",
            vec![],
        ),
        // ── Admin (6) ─────────────────────────────────────────────
        tool(
            "get_targets",
            CATEGORY_ADMIN,
            "Get information about all scrape targets",
            vec![],
        ),
        tool(
            "get_build_info",
            CATEGORY_ADMIN,
            "Get build information about the Prometheus server",
            vec![],
        ),
        tool(
            "get_runtime_info",
            CATEGORY_ADMIN,
            "Get runtime information about the Prometheus server",
            vec![],
        ),
        tool(
            "get_flags",
            CATEGORY_ADMIN,
            "Get runtime flags that Prometheus was launched with",
            vec![],
        ),
        tool("get_config", CATEGORY_ADMIN, "Get Prometheus configuration", vec![]),
        tool(
            "get_tsdb_stats",
            CATEGORY_ADMIN,
            "Get TSDB cardinality statistics",
            vec![string("limit", "Maximum number of stats entries to return")],
        ),
    ]
}

/// All 18 tool declarations, in listing order.
pub fn all_tools() -> &'static [ToolSpec] {
    static REGISTRY: OnceLock<Vec<ToolSpec>> = OnceLock::new();
    REGISTRY.get_or_init(build_registry)
}

pub fn find_tool(name: &str) -> Option<&'static ToolSpec> {
    all_tools().iter().find(|t| t.name == name)
}

pub fn all_tool_metadata() -> Vec<ToolMetadata> {
    all_tools().iter().map(ToolSpec::metadata).collect()
}

/// Return the set of tool names enabled for a given config.
pub fn enabled_tool_names(config: &ServerConfig) -> HashSet<String> {
    crate::config::loader::filter_tools(config, &all_tool_metadata())
        .into_iter()
        .map(|t| t.name)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{CategoryConfig, PresetName, ToolOverride};
    use std::collections::HashMap;

    #[test]
    fn registry_has_18_tools() {
        assert_eq!(all_tools().len(), 18);
    }

    #[test]
    fn all_tool_names_unique() {
        let names: HashSet<&str> = all_tools().iter().map(|t| t.name).collect();
        assert_eq!(names.len(), all_tools().len(), "duplicate tool names in registry");
    }

    #[test]
    fn all_categories_valid() {
        let valid: HashSet<&str> = ALL_CATEGORIES.iter().copied().collect();
        for t in all_tools() {
            assert!(
                valid.contains(t.category),
                "tool {} has invalid category: {}",
                t.name,
                t.category
            );
        }
    }

    #[test]
    fn category_distribution() {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for t in all_tools() {
            *counts.entry(t.category).or_default() += 1;
        }
        assert_eq!(counts[CATEGORY_QUERY], 3);
        assert_eq!(counts[CATEGORY_DISCOVERY], 6);
        assert_eq!(counts[CATEGORY_ALERTING], 3);
        assert_eq!(counts[CATEGORY_ADMIN], 6);
    }

    #[test]
    fn every_tool_has_connection_params_and_unlimited() {
        for t in all_tools() {
            let names: Vec<&str> = t.params.iter().map(|p| p.name).collect();
            for common in ["prometheus_url", "org_id", "unlimited"] {
                assert!(names.contains(&common), "{} lacks {common}", t.name);
            }
        }
    }

    #[test]
    fn param_names_unique_per_tool() {
        for t in all_tools() {
            let names: HashSet<&str> = t.params.iter().map(|p| p.name).collect();
            assert_eq!(names.len(), t.params.len(), "duplicate param in {}", t.name);
        }
    }

    #[test]
    fn required_params_are_declared_properties() {
        for t in all_tools() {
            let schema = t.input_schema();
            let props = schema["properties"].as_object().unwrap();
            if let Some(required) = schema.get("required") {
                for r in required.as_array().unwrap() {
                    assert!(props.contains_key(r.as_str().unwrap()));
                }
            }
        }
    }

    #[test]
    fn execute_range_query_schema() {
        let schema = find_tool("execute_range_query").unwrap().input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(
            schema["required"],
            json!(["query", "start", "end", "step"])
        );
        assert_eq!(schema["properties"]["step"]["type"], "string");
    }

    #[test]
    fn find_series_matches_is_required_array() {
        let schema = find_tool("find_series").unwrap().input_schema();
        assert_eq!(schema["properties"]["matches"]["type"], "array");
        assert_eq!(schema["properties"]["matches"]["items"]["type"], "string");
        assert_eq!(schema["required"], json!(["matches"]));
    }

    #[test]
    fn parameterless_tools_have_no_required_key() {
        let schema = find_tool("get_alerts").unwrap().input_schema();
        assert!(schema.get("required").is_none());
    }

    #[test]
    fn to_tool_carries_name_and_description() {
        let t = find_tool("get_rules").unwrap().to_tool();
        assert_eq!(t.name, "get_rules");
        assert_eq!(t.description.as_deref(), Some("Get recording and alerting rules"));
    }

    #[test]
    fn full_preset_enables_all_18() {
        assert_eq!(enabled_tool_names(&ServerConfig::default()).len(), 18);
    }

    #[test]
    fn minimal_preset_filters_correctly() {
        let config = ServerConfig {
            preset: PresetName::Minimal,
            ..Default::default()
        };
        let enabled = enabled_tool_names(&config);
        assert_eq!(enabled.len(), 9);
        assert!(enabled.contains("execute_query"));
        assert!(enabled.contains("find_series"));
        assert!(!enabled.contains("get_alerts"));
        assert!(!enabled.contains("get_config"));
    }

    #[test]
    fn standard_preset_adds_alerting() {
        let config = ServerConfig {
            preset: PresetName::Standard,
            ..Default::default()
        };
        let enabled = enabled_tool_names(&config);
        assert_eq!(enabled.len(), 12);
        assert!(enabled.contains("get_rules"));
        assert!(!enabled.contains("get_tsdb_stats"));
    }

    #[test]
    fn overrides_and_category_toggles_apply() {
        let mut config = ServerConfig::default();
        config
            .tools
            .overrides
            .insert("get_config".into(), ToolOverride::disabled("secrets"));
        config
            .tools
            .categories
            .insert(CATEGORY_ALERTING.into(), CategoryConfig { enabled: false });
        let enabled = enabled_tool_names(&config);
        assert_eq!(enabled.len(), 14);
        assert!(!enabled.contains("get_config"));
        assert!(!enabled.contains("get_alerts"));
    }
}
