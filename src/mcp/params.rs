//! Typed access to the loosely typed argument map of a tool call.

use rmcp::model::JsonObject;
use serde_json::Value;

use crate::error::ParamError;
use crate::prometheus::{QueryOptions, SelectorOptions};

/// Borrowed view over a call's `arguments` object.
#[derive(Debug, Clone, Copy)]
pub struct ToolArgs<'a> {
    args: Option<&'a JsonObject>,
}

impl<'a> ToolArgs<'a> {
    pub fn new(args: Option<&'a JsonObject>) -> Self {
        Self { args }
    }

    fn get(&self, name: &str) -> Option<&'a Value> {
        self.args.and_then(|a| a.get(name))
    }

    /// A non-empty string, or a [`ParamError::MissingString`].
    pub fn required_str(&self, name: &'static str) -> Result<&'a str, ParamError> {
        match self.get(name) {
            Some(Value::String(s)) if !s.is_empty() => Ok(s.as_str()),
            _ => Err(ParamError::MissingString(name)),
        }
    }

    /// Strings as-is; numbers and booleans in their JSON text form.
    /// Empty strings, null, arrays and objects read as absent.
    pub fn optional_str(&self, name: &str) -> Option<String> {
        match self.get(name)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// String elements of an array parameter. Anything else reads as empty.
    pub fn string_array(&self, name: &str) -> Vec<String> {
        match self.get(name) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn required_array(&self, name: &'static str) -> Result<Vec<String>, ParamError> {
        let items = self.string_array(name);
        if items.is_empty() {
            Err(ParamError::MissingArray(name))
        } else {
            Ok(items)
        }
    }

    /// `unlimited` is `"true"` (any case) or boolean `true`.
    pub fn unlimited(&self) -> bool {
        match self.get("unlimited") {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    pub fn prometheus_url(&self) -> Option<String> {
        self.optional_str("prometheus_url")
    }

    pub fn org_id(&self) -> Option<String> {
        self.optional_str("org_id")
    }

    /// `timeout`, `limit`, `stats`, `lookback_delta`.
    pub fn query_options(&self) -> QueryOptions {
        QueryOptions {
            timeout: self.optional_str("timeout"),
            limit: self.optional_str("limit"),
            stats: self.optional_str("stats"),
            lookback_delta: self.optional_str("lookback_delta"),
        }
    }

    /// `start_time`, `end_time`, `matches[]`, `limit`.
    pub fn selector_options(&self) -> SelectorOptions {
        SelectorOptions {
            start_time: self.optional_str("start_time"),
            end_time: self.optional_str("end_time"),
            matches: self.string_array("matches"),
            limit: self.optional_str("limit"),
        }
    }
}
