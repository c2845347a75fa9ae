//! Layered request pipeline for outgoing Prometheus calls.
//!
//! The chain is built innermost-first: [`DefaultTransport`] sends the request,
//! an optional auth layer ([`BearerAuth`] or [`BasicAuth`], never both) wraps
//! it, and an optional [`OrgIdHeader`] layer wraps that. Each layer decorates
//! the request and hands it to the layer it wraps.

use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{RequestBuilder, Response};

use super::factory::ConnectionConfig;

/// Tenant header understood by Cortex, Mimir, and Thanos.
pub const ORG_ID_HEADER: &str = "X-Scope-OrgID";

pub type ResponseFuture<'a> = BoxFuture<'a, Result<Response, reqwest::Error>>;

/// One link in the request pipeline.
pub trait RoundTrip: Send + Sync {
    fn round_trip(&self, request: RequestBuilder) -> ResponseFuture<'_>;
}

/// Terminal layer: sends the request as-is.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultTransport;

impl RoundTrip for DefaultTransport {
    fn round_trip(&self, request: RequestBuilder) -> ResponseFuture<'_> {
        Box::pin(request.send())
    }
}

pub struct BearerAuth {
    token: String,
    inner: Arc<dyn RoundTrip>,
}

impl RoundTrip for BearerAuth {
    fn round_trip(&self, request: RequestBuilder) -> ResponseFuture<'_> {
        self.inner.round_trip(request.bearer_auth(&self.token))
    }
}

pub struct BasicAuth {
    username: String,
    password: String,
    inner: Arc<dyn RoundTrip>,
}

impl RoundTrip for BasicAuth {
    fn round_trip(&self, request: RequestBuilder) -> ResponseFuture<'_> {
        self.inner
            .round_trip(request.basic_auth(&self.username, Some(&self.password)))
    }
}

pub struct OrgIdHeader {
    org_id: String,
    inner: Arc<dyn RoundTrip>,
}

impl RoundTrip for OrgIdHeader {
    fn round_trip(&self, request: RequestBuilder) -> ResponseFuture<'_> {
        self.inner
            .round_trip(request.header(ORG_ID_HEADER, self.org_id.as_str()))
    }
}

/// Which auth layer a connection ends up with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Bearer,
    Basic,
    None,
}

impl AuthMode {
    /// Bearer wins over basic; basic needs both username and password.
    pub fn for_config(config: &ConnectionConfig) -> Self {
        if config.token.is_some() {
            Self::Bearer
        } else if config.username.is_some() && config.password.is_some() {
            Self::Basic
        } else {
            Self::None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bearer => "bearer token",
            Self::Basic => "basic auth",
            Self::None => "none",
        }
    }
}

impl std::fmt::Display for AuthMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the layer chain for a resolved connection.
pub fn build_transport(config: &ConnectionConfig) -> Arc<dyn RoundTrip> {
    let mut transport: Arc<dyn RoundTrip> = Arc::new(DefaultTransport);

    if let Some(token) = &config.token {
        tracing::debug!("Using bearer token authentication");
        transport = Arc::new(BearerAuth {
            token: token.clone(),
            inner: transport,
        });
    } else if let (Some(username), Some(password)) = (&config.username, &config.password) {
        tracing::debug!(username = %username, "Using basic authentication");
        transport = Arc::new(BasicAuth {
            username: username.clone(),
            password: password.clone(),
            inner: transport,
        });
    } else {
        tracing::debug!("No authentication configured");
    }

    if let Some(org_id) = &config.org_id {
        tracing::debug!(org_id = %org_id, "Using organization ID");
        transport = Arc::new(OrgIdHeader {
            org_id: org_id.clone(),
            inner: transport,
        });
    }

    transport
}
