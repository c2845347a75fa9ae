//! Configuration data structures for mcp-prometheus.
//!
//! Defines the YAML config format: preset, Prometheus connection, tool
//! overrides and category toggles. Every field has a serde default so a
//! partial file (or no file at all) is valid.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::prometheus::ConnectionConfig;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration for the server.
///
/// Loaded from a YAML file and then overlaid with `PROMETHEUS_*` and
/// `MCP_PROMETHEUS_PRESET` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Config format version (currently "1.0").
    #[serde(default = "default_version")]
    pub version: String,

    /// Active preset name.
    #[serde(default = "default_preset")]
    pub preset: PresetName,

    /// Default Prometheus connection.
    #[serde(default)]
    pub prometheus: ConnectionConfig,

    /// Per-tool and per-category overrides.
    #[serde(default)]
    pub tools: ToolsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            preset: PresetName::Full,
            prometheus: ConnectionConfig::default(),
            tools: ToolsConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Check whether a specific category is enabled (defaults to true).
    pub fn is_category_enabled(&self, category: &str) -> bool {
        self.tools
            .categories
            .get(category)
            .map(|c| c.enabled)
            .unwrap_or(true)
    }

    /// Check whether a specific tool is enabled (defaults to true).
    pub fn is_tool_enabled(&self, tool_name: &str) -> bool {
        self.tools
            .overrides
            .get(tool_name)
            .map(|o| o.enabled)
            .unwrap_or(true)
    }
}

// ---------------------------------------------------------------------------
// PresetName
// ---------------------------------------------------------------------------

/// Named presets that control which tool categories are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetName {
    /// Queries and metric discovery.
    Minimal,
    /// Minimal plus alerting.
    Standard,
    /// Every tool.
    Full,
}

impl PresetName {
    /// Parse from a loose string (case-insensitive, surrounding space ignored).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "minimal" => Some(Self::Minimal),
            "standard" => Some(Self::Standard),
            "full" => Some(Self::Full),
            _ => None,
        }
    }

    /// Canonical string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Standard => "standard",
            Self::Full => "full",
        }
    }
}

impl std::fmt::Display for PresetName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ToolsConfig
// ---------------------------------------------------------------------------

/// Per-tool and per-category configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Individual tool overrides (enable/disable specific tools).
    #[serde(default)]
    pub overrides: HashMap<String, ToolOverride>,

    /// Category-level toggles (enable/disable entire groups).
    #[serde(default)]
    pub categories: HashMap<String, CategoryConfig>,
}

/// Override the enabled state of a single tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOverride {
    pub enabled: bool,

    /// Human-readable reason for the override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ToolOverride {
    /// Create a disabled override with a reason.
    pub fn disabled(reason: impl Into<String>) -> Self {
        Self {
            enabled: false,
            reason: Some(reason.into()),
        }
    }
}

/// Enable or disable an entire tool category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub enabled: bool,
}

// ---------------------------------------------------------------------------
// ToolMetadata (for filtering)
// ---------------------------------------------------------------------------

/// Lightweight metadata about a single MCP tool, used for filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolMetadata {
    /// Tool name as registered in the MCP server.
    pub name: String,
    /// Category this tool belongs to.
    pub category: String,
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_version() -> String {
    "1.0".to_string()
}

fn default_preset() -> PresetName {
    PresetName::Full
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
