//! Preset definitions: minimal, standard, full.
//!
//! Each preset names the tool categories it turns on. Presets map onto the
//! four categories the server exposes.

use super::schema::PresetName;
use std::collections::HashSet;

// ---------------------------------------------------------------------------
// Tool categories
// ---------------------------------------------------------------------------

pub const CATEGORY_QUERY: &str = "query";
pub const CATEGORY_DISCOVERY: &str = "discovery";
pub const CATEGORY_ALERTING: &str = "alerting";
pub const CATEGORY_ADMIN: &str = "admin";

/// All known category names, for iteration.
pub const ALL_CATEGORIES: &[&str] = &[
    CATEGORY_QUERY,
    CATEGORY_DISCOVERY,
    CATEGORY_ALERTING,
    CATEGORY_ADMIN,
];

// ---------------------------------------------------------------------------
// PresetDefinition
// ---------------------------------------------------------------------------

/// Describes a single preset's characteristics.
#[derive(Debug, Clone)]
pub struct PresetDefinition {
    pub name: PresetName,
    /// Human-readable description.
    pub description: &'static str,
    /// Which categories are enabled in this preset.
    pub enabled_categories: Vec<&'static str>,
}

/// Get the preset definition for a given name.
pub fn get_preset(name: &PresetName) -> PresetDefinition {
    match name {
        PresetName::Minimal => minimal_preset(),
        PresetName::Standard => standard_preset(),
        PresetName::Full => full_preset(),
    }
}

/// Query and discovery only. Smallest tool list for lean context windows.
pub fn minimal_preset() -> PresetDefinition {
    PresetDefinition {
        name: PresetName::Minimal,
        description: "PromQL queries and metric discovery",
        enabled_categories: vec![CATEGORY_QUERY, CATEGORY_DISCOVERY],
    }
}

/// Adds alerts and rules on top of minimal.
pub fn standard_preset() -> PresetDefinition {
    PresetDefinition {
        name: PresetName::Standard,
        description: "Queries, discovery, alerts and recording/alerting rules",
        enabled_categories: vec![CATEGORY_QUERY, CATEGORY_DISCOVERY, CATEGORY_ALERTING],
    }
}

pub fn full_preset() -> PresetDefinition {
    PresetDefinition {
        name: PresetName::Full,
        description: "Every tool, including targets, server status and TSDB stats",
        enabled_categories: ALL_CATEGORIES.to_vec(),
    }
}

/// Return the set of enabled category names for a preset.
pub fn enabled_categories(name: &PresetName) -> HashSet<&'static str> {
    get_preset(name).enabled_categories.into_iter().collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
