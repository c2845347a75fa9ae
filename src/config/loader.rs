//! Config loading: defaults, then the YAML file, then the environment.
//!
//! The environment layer is applied through an injectable lookup so tests
//! never touch the process environment.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::preset::enabled_categories;
use super::schema::{PresetName, ServerConfig, ToolMetadata};
use crate::error::ConfigError;
use crate::prometheus::factory::non_empty;

pub const CONFIG_FILE_NAME: &str = "config.yaml";

pub const ENV_URL: &str = "PROMETHEUS_URL";
pub const ENV_USERNAME: &str = "PROMETHEUS_USERNAME";
pub const ENV_PASSWORD: &str = "PROMETHEUS_PASSWORD";
pub const ENV_TOKEN: &str = "PROMETHEUS_TOKEN";
pub const ENV_ORG_ID: &str = "PROMETHEUS_ORGID";
pub const ENV_PRESET: &str = "MCP_PROMETHEUS_PRESET";

/// `<config_dir>/mcp-prometheus/config.yaml` for the current platform.
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "mcp-prometheus")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Load the effective config using the process environment.
pub fn load_config(explicit: Option<&Path>) -> Result<ServerConfig, ConfigError> {
    load_config_with(explicit, default_config_path(), |key| std::env::var(key).ok())
}

/// Load the effective config.
///
/// An `explicit` path must exist. The `fallback` path is read only when it
/// exists; otherwise defaults are used.
pub fn load_config_with<F>(
    explicit: Option<&Path>,
    fallback: Option<PathBuf>,
    env: F,
) -> Result<ServerConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match explicit {
        Some(path) => load_config_file(path)?,
        None => match fallback.filter(|p| p.is_file()) {
            Some(path) => load_config_file(&path)?,
            None => {
                debug!("No config file found, using defaults");
                ServerConfig::default()
            }
        },
    };
    apply_env_overrides(&mut config, env)?;
    Ok(config)
}

/// Read and parse one YAML config file.
pub fn load_config_file(path: &Path) -> Result<ServerConfig, ConfigError> {
    debug!(path = %path.display(), "Loading config file");
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    load_config_from_str(&content, path)
}

pub fn load_config_from_str(content: &str, path: &Path) -> Result<ServerConfig, ConfigError> {
    if content.trim().is_empty() {
        return Ok(ServerConfig::default());
    }
    let config: ServerConfig =
        serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(ServerConfig {
        prometheus: config.prometheus.normalized(),
        ..config
    })
}

/// Overlay `PROMETHEUS_*` and `MCP_PROMETHEUS_PRESET`. Empty variables are
/// ignored.
pub fn apply_env_overrides<F>(config: &mut ServerConfig, env: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| non_empty(env(key));
    let conn = &mut config.prometheus;

    if let Some(url) = var(ENV_URL) {
        conn.url = Some(url);
    }
    if let Some(username) = var(ENV_USERNAME) {
        conn.username = Some(username);
    }
    if let Some(password) = var(ENV_PASSWORD) {
        conn.password = Some(password);
    }
    if let Some(token) = var(ENV_TOKEN) {
        conn.token = Some(token);
    }
    if let Some(org_id) = var(ENV_ORG_ID) {
        conn.org_id = Some(org_id);
    }

    if let Some(raw) = var(ENV_PRESET) {
        config.preset =
            PresetName::from_str_loose(&raw).ok_or(ConfigError::UnknownPreset(raw))?;
    }
    Ok(())
}

/// Keep the tools whose category is in the preset, whose category is not
/// toggled off, and which are not overridden off.
pub fn filter_tools(config: &ServerConfig, tools: &[ToolMetadata]) -> Vec<ToolMetadata> {
    let active = enabled_categories(&config.preset);
    tools
        .iter()
        .filter(|t| active.contains(t.category.as_str()))
        .filter(|t| config.is_category_enabled(&t.category))
        .filter(|t| config.is_tool_enabled(&t.name))
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
