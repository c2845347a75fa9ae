//! Async client for the Prometheus HTTP API v1.
//!
//! Every call goes through the connection's [`RoundTrip`] chain and carries a
//! fixed per-operation timeout. Responses are decoded from the standard
//! `{status, data, errorType, error, warnings}` envelope.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::factory::ConnectionConfig;
use super::options::{parse_limit, QueryOptions, QueryPairs, SelectorOptions};
use super::time::{parse_step, parse_timestamp};
use super::transport::{build_transport, AuthMode, RoundTrip};
use crate::error::PrometheusError;

/// Timeout for everything except range queries.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Range queries scan more data and get a longer budget.
pub const RANGE_QUERY_TIMEOUT: Duration = Duration::from_secs(60);

/// Upper bound on how much of a non-JSON error body is kept in the error.
const ERROR_BODY_LIMIT: usize = 512;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: String,
    #[serde(default = "Option::default")]
    data: Option<T>,
    #[serde(rename = "errorType", default)]
    error_type: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    warnings: Vec<String>,
}

/// Decoded `data` plus any warnings Prometheus attached.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub data: T,
    pub warnings: Vec<String>,
}

/// Result of an instant or range query.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryData {
    #[serde(rename = "resultType")]
    pub result_type: String,
    #[serde(default)]
    pub result: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetsData {
    #[serde(default)]
    pub active_targets: Vec<Value>,
    #[serde(default)]
    pub dropped_targets: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigData {
    #[serde(default)]
    pub yaml: String,
}

/// One series: label name to value, sorted by name.
pub type SeriesLabels = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// A Prometheus API client bound to one resolved connection.
#[derive(Clone)]
pub struct PrometheusClient {
    http: reqwest::Client,
    base_url: Url,
    transport: Arc<dyn RoundTrip>,
    connection: ConnectionConfig,
}

impl std::fmt::Debug for PrometheusClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusClient")
            .field("base_url", &self.base_url.as_str())
            .field("auth", &self.auth_mode())
            .field("org_id", &self.connection.org_id)
            .finish()
    }
}

impl PrometheusClient {
    /// Build a client for a connection whose URL has already been resolved.
    pub fn new(http: reqwest::Client, connection: ConnectionConfig) -> Result<Self, PrometheusError> {
        let raw = connection
            .url
            .as_deref()
            .ok_or(PrometheusError::MissingUrl)?;
        let base_url = parse_base_url(raw)?;
        let transport = build_transport(&connection);
        Ok(Self {
            http,
            base_url,
            transport,
            connection,
        })
    }

    pub fn auth_mode(&self) -> AuthMode {
        AuthMode::for_config(&self.connection)
    }

    // -- query ----------------------------------------------------------------

    /// `GET /api/v1/query`. `time` defaults to server "now" when absent.
    pub async fn query(
        &self,
        query: &str,
        time: Option<&str>,
        options: &QueryOptions,
    ) -> Result<ApiResponse<QueryData>, PrometheusError> {
        let mut pairs: QueryPairs = vec![("query", query.to_string())];
        if let Some(t) = time {
            pairs.push(("time", parse_timestamp(t)?));
        }
        options.append_to(&mut pairs)?;
        let timeout = options.http_timeout(DEFAULT_TIMEOUT)?;

        let response: ApiResponse<QueryData> = self.get(&["query"], &pairs, timeout).await?;
        log_warnings("Query returned warnings", &response.warnings);
        Ok(response)
    }

    /// `GET /api/v1/query_range`.
    pub async fn query_range(
        &self,
        query: &str,
        start: &str,
        end: &str,
        step: &str,
        options: &QueryOptions,
    ) -> Result<ApiResponse<QueryData>, PrometheusError> {
        let mut pairs: QueryPairs = vec![
            ("query", query.to_string()),
            ("start", parse_timestamp(start)?),
            ("end", parse_timestamp(end)?),
            ("step", parse_step(step)?),
        ];
        options.append_to(&mut pairs)?;
        let timeout = options.http_timeout(RANGE_QUERY_TIMEOUT)?;

        let response: ApiResponse<QueryData> =
            self.get(&["query_range"], &pairs, timeout).await?;
        log_warnings("Range query returned warnings", &response.warnings);
        Ok(response)
    }

    /// `GET /api/v1/query_exemplars`.
    pub async fn query_exemplars(
        &self,
        query: &str,
        start: &str,
        end: &str,
    ) -> Result<ApiResponse<Value>, PrometheusError> {
        let pairs: QueryPairs = vec![
            ("query", query.to_string()),
            ("start", parse_timestamp(start)?),
            ("end", parse_timestamp(end)?),
        ];
        self.get(&["query_exemplars"], &pairs, DEFAULT_TIMEOUT).await
    }

    // -- discovery ------------------------------------------------------------

    /// Metric names, i.e. the values of the `__name__` label.
    pub async fn list_metrics(
        &self,
        options: &SelectorOptions,
    ) -> Result<ApiResponse<Vec<String>>, PrometheusError> {
        self.label_values("__name__", options).await
    }

    /// `GET /api/v1/labels`.
    pub async fn label_names(
        &self,
        options: &SelectorOptions,
    ) -> Result<ApiResponse<Vec<String>>, PrometheusError> {
        let mut pairs = QueryPairs::new();
        options.append_to(&mut pairs)?;
        self.get(&["labels"], &pairs, DEFAULT_TIMEOUT).await
    }

    /// `GET /api/v1/label/<label>/values`.
    pub async fn label_values(
        &self,
        label: &str,
        options: &SelectorOptions,
    ) -> Result<ApiResponse<Vec<String>>, PrometheusError> {
        let mut pairs = QueryPairs::new();
        options.append_to(&mut pairs)?;
        self.get(&["label", label, "values"], &pairs, DEFAULT_TIMEOUT)
            .await
    }

    /// `GET /api/v1/series`. `options.matches` must be non-empty.
    pub async fn series(
        &self,
        options: &SelectorOptions,
    ) -> Result<ApiResponse<Vec<SeriesLabels>>, PrometheusError> {
        let mut pairs = QueryPairs::new();
        options.append_to(&mut pairs)?;
        self.get(&["series"], &pairs, DEFAULT_TIMEOUT).await
    }

    /// `GET /api/v1/metadata`, keyed by metric name.
    pub async fn metric_metadata(
        &self,
        metric: &str,
        limit: Option<&str>,
    ) -> Result<ApiResponse<Value>, PrometheusError> {
        let mut pairs: QueryPairs = vec![("metric", metric.to_string())];
        if let Some(l) = limit {
            pairs.push(("limit", parse_limit(l)?.to_string()));
        }
        self.get(&["metadata"], &pairs, DEFAULT_TIMEOUT).await
    }

    /// `GET /api/v1/targets/metadata`.
    pub async fn targets_metadata(
        &self,
        match_target: Option<&str>,
        metric: Option<&str>,
        limit: Option<&str>,
    ) -> Result<ApiResponse<Value>, PrometheusError> {
        let mut pairs = QueryPairs::new();
        if let Some(m) = match_target {
            pairs.push(("match_target", m.to_string()));
        }
        if let Some(m) = metric {
            pairs.push(("metric", m.to_string()));
        }
        if let Some(l) = limit {
            pairs.push(("limit", parse_limit(l)?.to_string()));
        }
        self.get(&["targets", "metadata"], &pairs, DEFAULT_TIMEOUT)
            .await
    }

    // -- targets, alerting, status --------------------------------------------

    pub async fn targets(&self) -> Result<ApiResponse<TargetsData>, PrometheusError> {
        self.get(&["targets"], &[], DEFAULT_TIMEOUT).await
    }

    pub async fn alerts(&self) -> Result<ApiResponse<Value>, PrometheusError> {
        self.get(&["alerts"], &[], DEFAULT_TIMEOUT).await
    }

    pub async fn alertmanagers(&self) -> Result<ApiResponse<Value>, PrometheusError> {
        self.get(&["alertmanagers"], &[], DEFAULT_TIMEOUT).await
    }

    pub async fn rules(&self) -> Result<ApiResponse<Value>, PrometheusError> {
        self.get(&["rules"], &[], DEFAULT_TIMEOUT).await
    }

    pub async fn build_info(&self) -> Result<ApiResponse<Value>, PrometheusError> {
        self.get(&["status", "buildinfo"], &[], DEFAULT_TIMEOUT)
            .await
    }

    pub async fn runtime_info(&self) -> Result<ApiResponse<Value>, PrometheusError> {
        self.get(&["status", "runtimeinfo"], &[], DEFAULT_TIMEOUT)
            .await
    }

    pub async fn flags(&self) -> Result<ApiResponse<Value>, PrometheusError> {
        self.get(&["status", "flags"], &[], DEFAULT_TIMEOUT).await
    }

    pub async fn status_config(&self) -> Result<ApiResponse<ConfigData>, PrometheusError> {
        self.get(&["status", "config"], &[], DEFAULT_TIMEOUT).await
    }

    /// `GET /api/v1/status/tsdb`.
    pub async fn tsdb_stats(&self, limit: Option<&str>) -> Result<ApiResponse<Value>, PrometheusError> {
        let mut pairs = QueryPairs::new();
        if let Some(l) = limit {
            pairs.push(("limit", parse_limit(l)?.to_string()));
        }
        self.get(&["status", "tsdb"], &pairs, DEFAULT_TIMEOUT).await
    }

    // -- plumbing ---------------------------------------------------------------

    /// `<base>/api/v1/<segments...>`, keeping any path prefix on the base URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // parse_base_url rejects cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["api", "v1"]).extend(segments);
        }
        url
    }

    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        pairs: &[(&'static str, String)],
        timeout: Duration,
    ) -> Result<ApiResponse<T>, PrometheusError> {
        let url = self.endpoint(segments);
        tracing::debug!(url = %url, params = pairs.len(), "Prometheus API request");

        let request = self.http.get(url).query(pairs).timeout(timeout);
        let response = self.transport.round_trip(request).await?;
        let status = response.status();
        let body = response.text().await?;
        decode_envelope(status, &body)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, PrometheusError> {
    let invalid = |reason: String| PrometheusError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot be used as a base".into()));
    }
    Ok(url)
}

fn decode_envelope<T: DeserializeOwned>(
    status: StatusCode,
    body: &str,
) -> Result<ApiResponse<T>, PrometheusError> {
    match serde_json::from_str::<Envelope<T>>(body) {
        Ok(env) if env.status == "success" => match env.data {
            Some(data) => Ok(ApiResponse {
                data,
                warnings: env.warnings,
            }),
            None => Err(PrometheusError::Api {
                error_type: "bad_response".into(),
                message: "response has no data field".into(),
            }),
        },
        Ok(env) => Err(PrometheusError::Api {
            error_type: env.error_type.unwrap_or_else(|| "unknown".into()),
            message: env
                .error
                .unwrap_or_else(|| format!("request failed with HTTP {}", status.as_u16())),
        }),
        Err(e) if status.is_success() => Err(PrometheusError::Decode(e)),
        Err(_) => Err(PrometheusError::Status {
            status: status.as_u16(),
            body: truncate_body(body),
        }),
    }
}

fn truncate_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.len() <= ERROR_BODY_LIMIT {
        return trimmed.to_string();
    }
    let mut end = ERROR_BODY_LIMIT;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &trimmed[..end])
}

fn log_warnings(message: &str, warnings: &[String]) {
    if !warnings.is_empty() {
        tracing::warn!(?warnings, "{}", message);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(url: &str) -> PrometheusClient {
        PrometheusClient::new(
            reqwest::Client::new(),
            ConnectionConfig {
                url: Some(url.to_string()),
                ..Default::default()
            },
        )
        .unwrap()
    }

    fn success(data: Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({"status": "success", "data": data}))
    }

    #[tokio::test]
    async fn instant_query_decodes_vector() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/query"))
            .and(query_param("query", "up"))
            .respond_with(success(json!({"resultType": "vector", "result": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let resp = client
            .query("up", None, &QueryOptions::default())
            .await
            .unwrap();
        assert_eq!(resp.data.result_type, "vector");
        assert_eq!(resp.data.result, json!([]));
    }

    #[tokio::test]
    async fn instant_query_sends_time_and_options() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/query"))
            .and(query_param("time", "1672531200"))
            .and(query_param("timeout", "10s"))
            .and(query_param("limit", "5"))
            .and(query_param("stats", "all"))
            .and(query_param("lookback_delta", "1m"))
            .respond_with(success(json!({"resultType": "scalar", "result": [1672531200, "1"]})))
            .expect(1)
            .mount(&server)
            .await;

        let opts = QueryOptions {
            timeout: Some("10s".into()),
            limit: Some("5".into()),
            stats: Some("all".into()),
            lookback_delta: Some("1m".into()),
        };
        let resp = client_for(&server.uri())
            .query("1", Some("2023-01-01T00:00:00Z"), &opts)
            .await
            .unwrap();
        assert_eq!(resp.data.result_type, "scalar");
    }

    #[tokio::test]
    async fn range_query_sends_bounds_and_step() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/query_range"))
            .and(query_param("start", "1672531200"))
            .and(query_param("end", "1672534800"))
            .and(query_param("step", "1m"))
            .respond_with(success(json!({"resultType": "matrix", "result": []})))
            .expect(1)
            .mount(&server)
            .await;

        let resp = client_for(&server.uri())
            .query_range(
                "up",
                "2023-01-01T00:00:00Z",
                "2023-01-01T01:00:00Z",
                "1m",
                &QueryOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(resp.data.result_type, "matrix");
    }

    #[tokio::test]
    async fn range_query_rejects_bad_step_without_calling_server() {
        let server = MockServer::start().await;
        let err = client_for(&server.uri())
            .query_range("up", "0", "60", "soon", &QueryOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PrometheusError::InvalidDuration(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_metrics_uses_name_label() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/label/__name__/values"))
            .respond_with(success(json!(["metric1", "metric2"])))
            .mount(&server)
            .await;

        let resp = client_for(&server.uri())
            .list_metrics(&SelectorOptions::default())
            .await
            .unwrap();
        assert_eq!(resp.data, vec!["metric1", "metric2"]);
    }

    #[tokio::test]
    async fn series_sends_repeated_matchers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/series"))
            .respond_with(success(json!([{"__name__": "up", "job": "node"}])))
            .mount(&server)
            .await;

        let opts = SelectorOptions {
            matches: vec!["up".into(), "{job=\"node\"}".into()],
            ..Default::default()
        };
        let resp = client_for(&server.uri()).series(&opts).await.unwrap();
        assert_eq!(resp.data.len(), 1);
        assert_eq!(resp.data[0]["job"], "node");

        let requests = server.received_requests().await.unwrap();
        let matchers: Vec<String> = requests[0]
            .url
            .query_pairs()
            .filter(|(k, _)| k == "match[]")
            .map(|(_, v)| v.into_owned())
            .collect();
        assert_eq!(matchers, vec!["up", "{job=\"node\"}"]);
    }

    #[tokio::test]
    async fn metadata_and_targets_decode() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/metadata"))
            .and(query_param("metric", "http_requests_total"))
            .respond_with(success(json!({
                "http_requests_total": [{"type": "counter", "help": "Total HTTP requests", "unit": ""}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/targets"))
            .respond_with(success(json!({"activeTargets": [], "droppedTargets": []})))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let meta = client
            .metric_metadata("http_requests_total", None)
            .await
            .unwrap();
        assert!(meta.data.get("http_requests_total").is_some());

        let targets = client.targets().await.unwrap();
        assert!(targets.data.active_targets.is_empty());
        assert!(targets.data.dropped_targets.is_empty());
    }

    #[tokio::test]
    async fn path_prefix_is_preserved() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/prometheus/api/v1/status/buildinfo"))
            .respond_with(success(json!({"version": "2.48.0"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&format!("{}/prometheus/", server.uri()));
        let info = client.build_info().await.unwrap();
        assert_eq!(info.data["version"], "2.48.0");
    }

    #[tokio::test]
    async fn error_envelope_becomes_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/query"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "status": "error",
                "errorType": "bad_data",
                "error": "1:4: parse error: unexpected end of input"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server.uri())
            .query("up{", None, &QueryOptions::default())
            .await
            .unwrap_err();
        match err {
            PrometheusError::Api {
                error_type,
                message,
            } => {
                assert_eq!(error_type, "bad_data");
                assert!(message.contains("parse error"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_failure_becomes_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/rules"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = client_for(&server.uri()).rules().await.unwrap_err();
        match err {
            PrometheusError::Status { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body, "bad gateway");
            }
            other => panic!("expected Status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn garbage_success_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/alerts"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client_for(&server.uri()).alerts().await.unwrap_err();
        assert!(matches!(err, PrometheusError::Decode(_)));
    }

    #[test]
    fn base_url_validation() {
        assert!(parse_base_url("http://localhost:9090").is_ok());
        assert!(parse_base_url("https://mimir.example.com/prometheus").is_ok());
        assert!(matches!(
            parse_base_url("localhost:9090"),
            Err(PrometheusError::InvalidUrl { .. })
        ));
        assert!(matches!(
            parse_base_url("ftp://example.com"),
            Err(PrometheusError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn endpoint_joins_segments() {
        let client = client_for("http://localhost:9090");
        assert_eq!(
            client.endpoint(&["label", "job", "values"]).as_str(),
            "http://localhost:9090/api/v1/label/job/values"
        );
        let prefixed = client_for("http://localhost:8080/prometheus");
        assert_eq!(
            prefixed.endpoint(&["query"]).as_str(),
            "http://localhost:8080/prometheus/api/v1/query"
        );
    }

    #[test]
    fn long_error_bodies_are_cut() {
        let body = "x".repeat(ERROR_BODY_LIMIT * 2);
        let cut = truncate_body(&body);
        assert_eq!(cut.len(), ERROR_BODY_LIMIT + 3);
        assert!(cut.ends_with("..."));
    }
}
