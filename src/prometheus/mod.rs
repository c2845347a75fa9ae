//! Prometheus HTTP API access: connection resolution, the auth/tenant
//! request pipeline, parameter parsing, and the typed client.

pub mod client;
pub mod factory;
pub mod options;
pub mod time;
pub mod transport;

pub use client::{ApiResponse, PrometheusClient, QueryData, TargetsData};
pub use factory::{client_from_params, resolve_connection, ConnectionConfig};
pub use options::{QueryOptions, SelectorOptions};
pub use transport::AuthMode;
