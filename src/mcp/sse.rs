//! Legacy HTTP+SSE transport.
//!
//! `GET <sse_endpoint>` opens an event stream whose first event (`endpoint`)
//! tells the client where to POST its JSON-RPC messages. Replies arrive on the
//! stream as `message` events. Each stream is one MCP session.
//!
//! Usage: `mcp-prometheus serve --transport sse --http-addr :8080`

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::channel::mpsc::{self, UnboundedSender};
use futures::{Stream, StreamExt};
use rmcp::model::{ClientJsonRpcMessage, ServerJsonRpcMessage};
use rmcp::ServiceExt;
use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::http::{normalize_addr, normalize_endpoint, shutdown_signal};
use super::server::PrometheusServer;

type SessionMap = Arc<Mutex<HashMap<String, UnboundedSender<ClientJsonRpcMessage>>>>;

fn next_session_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Clone)]
struct SseState {
    server: PrometheusServer,
    sessions: SessionMap,
    message_endpoint: String,
}

/// Removes the session once its event stream is dropped.
struct SessionGuard {
    sessions: SessionMap,
    id: String,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.remove(&self.id);
        debug!(session = %self.id, "SSE session closed");
    }
}

#[derive(Debug, Deserialize)]
struct MessageQuery {
    #[serde(rename = "sessionId")]
    session_id: String,
}

pub fn sse_router(server: PrometheusServer, sse_endpoint: &str, message_endpoint: &str) -> Router {
    let message_endpoint = normalize_endpoint(message_endpoint);
    let state = SseState {
        server,
        sessions: Arc::default(),
        message_endpoint: message_endpoint.clone(),
    };
    Router::new()
        .route(&normalize_endpoint(sse_endpoint), get(handle_sse))
        .route(&message_endpoint, post(handle_message))
        .with_state(state)
}

async fn handle_sse(
    State(state): State<SseState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let session_id = next_session_id();
    let (client_tx, client_rx) = mpsc::unbounded::<ClientJsonRpcMessage>();
    let (server_tx, server_rx) = mpsc::unbounded::<ServerJsonRpcMessage>();

    state
        .sessions
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .insert(session_id.clone(), client_tx);
    debug!(session = %session_id, "SSE session opened");

    let server = state.server.clone();
    let task_session = session_id.clone();
    tokio::spawn(async move {
        match server.serve((server_tx, client_rx)).await {
            Ok(running) => {
                let _ = running.waiting().await;
            }
            Err(e) => warn!(session = %task_session, "SSE session failed to start: {e}"),
        }
    });

    let guard = SessionGuard {
        sessions: state.sessions.clone(),
        id: session_id.clone(),
    };
    let endpoint = format!("{}?sessionId={}", state.message_endpoint, session_id);
    let first = futures::stream::once(async move {
        Ok::<_, Infallible>(Event::default().event("endpoint").data(endpoint))
    });
    let messages = server_rx.map(move |msg| {
        let _session = &guard;
        let payload = serde_json::to_string(&msg).unwrap_or_default();
        Ok::<_, Infallible>(Event::default().event("message").data(payload))
    });

    Sse::new(first.chain(messages)).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

async fn handle_message(
    State(state): State<SseState>,
    Query(query): Query<MessageQuery>,
    Json(message): Json<ClientJsonRpcMessage>,
) -> StatusCode {
    let sender = state
        .sessions
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .get(&query.session_id)
        .cloned();

    let Some(tx) = sender else {
        return StatusCode::NOT_FOUND;
    };
    if tx.unbounded_send(message).is_err() {
        StatusCode::GONE
    } else {
        StatusCode::ACCEPTED
    }
}

/// Start the MCP server over the legacy SSE transport.
pub async fn run_sse_server(
    server: PrometheusServer,
    addr: &str,
    sse_endpoint: &str,
    message_endpoint: &str,
) -> anyhow::Result<()> {
    let addr = normalize_addr(addr);
    let router = sse_router(server, sse_endpoint, message_endpoint);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        "MCP SSE server listening on http://{}{} (messages at {})",
        listener.local_addr()?,
        normalize_endpoint(sse_endpoint),
        normalize_endpoint(message_endpoint)
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
