//! mcp-prometheus: exposes the Prometheus HTTP API to MCP clients.
//!
//! Eighteen tools cover PromQL queries, metric and label discovery, alerting
//! state, and server administration. The server speaks MCP over stdio,
//! streamable HTTP, or the legacy SSE transport.

pub mod cli;
pub mod config;
pub mod error;
pub mod mcp;
pub mod observability;
pub mod prometheus;
