//! HTTP transport for the MCP server using rmcp's StreamableHttpService.
//!
//! Lets remote MCP clients connect over HTTP instead of stdio.
//!
//! Usage: `mcp-prometheus serve --transport streamable-http --http-addr :8080`

use axum::Router;
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpService,
};
use tracing::info;

use super::server::PrometheusServer;

/// `:8080` binds every interface; anything else is used as given.
pub fn normalize_addr(addr: &str) -> String {
    if addr.starts_with(':') {
        format!("0.0.0.0{addr}")
    } else {
        addr.to_string()
    }
}

/// Leading slash, no trailing slash (except for the root itself).
pub fn normalize_endpoint(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Router serving the MCP streamable HTTP protocol at `endpoint` (POST for
/// requests, SSE for server-initiated messages). Each client gets its own
/// session.
pub fn streamable_http_router(server: PrometheusServer, endpoint: &str) -> Router {
    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        Default::default(),
    );

    let endpoint = normalize_endpoint(endpoint);
    if endpoint == "/" {
        Router::new().fallback_service(service)
    } else {
        Router::new().nest_service(&endpoint, service)
    }
}

/// Start the MCP server over streamable HTTP on the given address.
pub async fn run_http_server(
    server: PrometheusServer,
    addr: &str,
    endpoint: &str,
) -> anyhow::Result<()> {
    let addr = normalize_addr(addr);
    let router = streamable_http_router(server, endpoint);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        "MCP streamable HTTP server listening on http://{}{}",
        listener.local_addr()?,
        normalize_endpoint(endpoint)
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Resolves on SIGINT, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutting down HTTP server");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use test_case::test_case;

    #[test_case(":8080", "0.0.0.0:8080" ; "port only")]
    #[test_case("127.0.0.1:9000", "127.0.0.1:9000" ; "full address")]
    #[test_case("localhost:80", "localhost:80" ; "hostname")]
    fn addr_normalization(input: &str, expected: &str) {
        assert_eq!(normalize_addr(input), expected);
    }

    #[test_case("/mcp", "/mcp" ; "already normal")]
    #[test_case("mcp", "/mcp" ; "missing slash")]
    #[test_case("/mcp/", "/mcp" ; "trailing slash")]
    #[test_case("/", "/" ; "root")]
    #[test_case("", "/" ; "empty")]
    fn endpoint_normalization(input: &str, expected: &str) {
        assert_eq!(normalize_endpoint(input), expected);
    }

    #[tokio::test]
    async fn streamable_http_answers_initialize() {
        let server = PrometheusServer::new(ServerConfig::default()).unwrap();
        let router = streamable_http_router(server, "/mcp");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {
                "protocolVersion": "2025-03-26",
                "capabilities": {},
                "clientInfo": {"name": "test", "version": "0.0.0"}
            }
        });
        let mut resp = reqwest::Client::new()
            .post(format!("http://{addr}/mcp"))
            .header("accept", "application/json, text/event-stream")
            .json(&body)
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_success(), "status {}", resp.status());

        let mut seen = String::new();
        let read = tokio::time::timeout(std::time::Duration::from_secs(5), async {
            while let Ok(Some(chunk)) = resp.chunk().await {
                seen.push_str(&String::from_utf8_lossy(&chunk));
                if seen.contains("mcp-prometheus") {
                    break;
                }
            }
        })
        .await;
        assert!(read.is_ok(), "timed out waiting for initialize result");
        assert!(seen.contains("mcp-prometheus"), "unexpected body: {seen}");
    }
}
