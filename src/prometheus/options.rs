//! Optional request modifiers: query options and discovery selectors.
//!
//! Both are plain value objects. `append_to` turns them into the query-string
//! pairs the Prometheus HTTP API expects.

use std::time::Duration;

use super::time::{parse_duration, parse_timestamp};
use crate::error::PrometheusError;

/// Extra grace on top of a caller-supplied query timeout, so Prometheus
/// gets to report its own timeout before the HTTP call gives up.
const TIMEOUT_GRACE: Duration = Duration::from_secs(5);

pub(crate) type QueryPairs = Vec<(&'static str, String)>;

/// Modifiers for instant and range queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    pub timeout: Option<String>,
    pub limit: Option<String>,
    pub stats: Option<String>,
    pub lookback_delta: Option<String>,
}

impl QueryOptions {
    /// HTTP timeout for a query carrying these options.
    pub fn http_timeout(&self, default: Duration) -> Result<Duration, PrometheusError> {
        match &self.timeout {
            Some(t) => {
                let requested = parse_duration(t)?
                    .checked_add(TIMEOUT_GRACE)
                    .ok_or_else(|| PrometheusError::InvalidDuration(t.clone()))?;
                Ok(default.max(requested))
            }
            None => Ok(default),
        }
    }

    pub(crate) fn append_to(&self, pairs: &mut QueryPairs) -> Result<(), PrometheusError> {
        if let Some(t) = &self.timeout {
            parse_duration(t)?;
            pairs.push(("timeout", t.trim().to_string()));
        }
        if let Some(l) = &self.limit {
            pairs.push(("limit", parse_limit(l)?.to_string()));
        }
        if let Some(s) = &self.stats {
            pairs.push(("stats", s.clone()));
        }
        if let Some(d) = &self.lookback_delta {
            parse_duration(d)?;
            pairs.push(("lookback_delta", d.trim().to_string()));
        }
        Ok(())
    }
}

/// Time range, series matchers, and limit for discovery endpoints
/// (label names/values, series, metric names).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorOptions {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub matches: Vec<String>,
    pub limit: Option<String>,
}

impl SelectorOptions {
    pub(crate) fn append_to(&self, pairs: &mut QueryPairs) -> Result<(), PrometheusError> {
        if let Some(s) = &self.start_time {
            pairs.push(("start", parse_timestamp(s)?));
        }
        if let Some(e) = &self.end_time {
            pairs.push(("end", parse_timestamp(e)?));
        }
        for m in &self.matches {
            pairs.push(("match[]", m.clone()));
        }
        if let Some(l) = &self.limit {
            pairs.push(("limit", parse_limit(l)?.to_string()));
        }
        Ok(())
    }
}

pub(crate) fn parse_limit(input: &str) -> Result<u64, PrometheusError> {
    input
        .trim()
        .parse::<u64>()
        .map_err(|_| PrometheusError::InvalidLimit(input.to_string()))
}
