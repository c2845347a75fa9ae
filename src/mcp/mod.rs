//! MCP server: Model Context Protocol implementation over stdio and HTTP.
//!
//! Tool handler logic is split into modules by category:
//! - [`tools_query`]: execute_query, execute_range_query, query_exemplars
//! - [`tools_discovery`]: metrics, labels, series and metadata lookups
//! - [`tools_alerting`]: alerts, alertmanagers, rules
//! - [`tools_admin`]: targets, build/runtime info, flags, config, TSDB stats
//! - [`server`]: `ServerHandler` impl and dispatch
//! - [`http`] / [`sse`]: HTTP transports on axum

pub mod format;
pub mod http;
pub mod params;
pub mod registry;
pub mod server;
pub mod sse;
pub mod tools_admin;
pub mod tools_alerting;
pub mod tools_discovery;
pub mod tools_query;

pub use server::PrometheusServer;
