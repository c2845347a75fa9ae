//! Per-call client construction.
//!
//! The server holds one base [`ConnectionConfig`] (config file overlaid by the
//! `PROMETHEUS_*` environment). Tool calls may pass `prometheus_url` and
//! `org_id`, but the base config always wins when it sets them. Credentials
//! are never taken from tool parameters.

use serde::{Deserialize, Serialize};

use super::client::PrometheusClient;
use crate::error::PrometheusError;

/// Where to reach Prometheus and how to authenticate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
}

impl ConnectionConfig {
    /// Drop empty and whitespace-only values so "set but empty" reads as unset.
    pub fn normalized(self) -> Self {
        Self {
            url: non_empty(self.url),
            username: non_empty(self.username),
            password: non_empty(self.password),
            token: non_empty(self.token),
            org_id: non_empty(self.org_id),
        }
    }
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Merge the base config with per-call overrides. Base values take
/// precedence; a URL must come from one of the two.
pub fn resolve_connection(
    base: &ConnectionConfig,
    url_param: Option<&str>,
    org_id_param: Option<&str>,
) -> Result<ConnectionConfig, PrometheusError> {
    let param = |v: Option<&str>| non_empty(v.map(str::to_string));

    let url = base
        .url
        .clone()
        .or_else(|| param(url_param))
        .ok_or(PrometheusError::MissingUrl)?;
    let org_id = base.org_id.clone().or_else(|| param(org_id_param));

    Ok(ConnectionConfig {
        url: Some(url),
        username: base.username.clone(),
        password: base.password.clone(),
        token: base.token.clone(),
        org_id,
    })
}

/// Resolve the connection for one tool call and build its client.
pub fn client_from_params(
    http: &reqwest::Client,
    base: &ConnectionConfig,
    url_param: Option<&str>,
    org_id_param: Option<&str>,
) -> Result<PrometheusClient, PrometheusError> {
    let config = resolve_connection(base, url_param, org_id_param)?;
    tracing::debug!(
        url = config.url.as_deref().unwrap_or_default(),
        org_id = config.org_id.as_deref().unwrap_or_default(),
        "Creating Prometheus client"
    );
    PrometheusClient::new(http.clone(), config)
}
