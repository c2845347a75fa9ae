//! Alerting tool handlers (3 tools): get_alerts, get_alertmanagers, get_rules.

use tracing::debug;

use crate::error::{upstream, ToolError};
use crate::prometheus::PrometheusClient;

use super::format::json_text;

// 10. get_alerts
pub async fn handle_get_alerts(client: &PrometheusClient) -> Result<String, ToolError> {
    debug!("Getting alerts");
    let resp = client.alerts().await.map_err(upstream("getting alerts"))?;
    Ok(format!("Active Alerts:\n{}", json_text(&resp.data)))
}

// 11. get_alertmanagers
pub async fn handle_get_alertmanagers(client: &PrometheusClient) -> Result<String, ToolError> {
    debug!("Getting alert managers");
    let resp = client
        .alertmanagers()
        .await
        .map_err(upstream("getting alert managers"))?;
    Ok(format!("AlertManager Discovery:\n{}", json_text(&resp.data)))
}

// 12. get_rules
pub async fn handle_get_rules(client: &PrometheusClient) -> Result<String, ToolError> {
    debug!("Getting rules");
    let resp = client.rules().await.map_err(upstream("getting rules"))?;
    Ok(format!("Prometheus Rules:\n{}", json_text(&resp.data)))
}
