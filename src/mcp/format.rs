//! Text rendering for tool results.
//!
//! Every tool's output goes through [`limit_output`] before it is returned,
//! so a single huge query result cannot flood the client's context window.

use std::collections::BTreeMap;

use serde_json::Value;

/// Byte length above which output is truncated.
pub const MAX_RESULT_LENGTH: usize = 50_000;

/// How far back from the cut point a newline may be used as the cut.
pub const TRUNCATION_WINDOW: usize = 1_000;

pub const TRUNCATION_ADVICE: &str = "

⚠️  RESULT TRUNCATED: The query returned a very large result (>50k characters).

💡 To optimize your query and get less output, consider:
   • Adding more specific label filters: {app=\"specific-app\", namespace=\"specific-ns\"}
   • Using aggregation functions: sum(), avg(), count(), etc.
   • Limiting time ranges for range queries
   • Using topk() or bottomk() to get only top/bottom N results
   • Filtering by specific metrics instead of using wildcards

🔧 To get the full untruncated result, add \"unlimited\": \"true\" to your query parameters, but be aware this may impact performance.";

pub const UNLIMITED_WARNING: &str = "⚠️  WARNING: Unlimited output enabled - this response may be very large and could impact performance.\n\n";

pub const METRIC_LIST_CAP: usize = 100;
pub const LABEL_VALUE_CAP: usize = 100;
pub const SERIES_CAP: usize = 50;

/// Apply the unlimited warning or the truncation policy to a tool's output.
pub fn limit_output(text: String, unlimited: bool) -> String {
    if unlimited {
        return format!("{UNLIMITED_WARNING}{text}");
    }
    if text.len() <= MAX_RESULT_LENGTH {
        return text;
    }

    let mut cut = MAX_RESULT_LENGTH;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    let mut kept = &text[..cut];
    if let Some(nl) = kept.rfind('\n') {
        if nl > MAX_RESULT_LENGTH - TRUNCATION_WINDOW {
            kept = &kept[..nl];
        }
    }
    format!("{kept}{TRUNCATION_ADVICE}")
}

/// Pretty JSON, falling back to compact form.
pub fn json_text(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

pub fn format_query_result(result_type: &str, result: &Value) -> String {
    format!(
        "Query executed successfully.\nResult Type: {}\nResult: {}",
        result_type,
        json_text(result)
    )
}

/// `1. a\n2. b\n...`, stopping after `cap` entries with a
/// `... and N more <noun>` line.
pub fn numbered_list<T: AsRef<str>>(items: &[T], cap: Option<usize>, noun: &str) -> String {
    let shown = cap.map_or(items.len(), |c| c.min(items.len()));
    let mut out = String::new();
    for (i, item) in items[..shown].iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, item.as_ref()));
    }
    if shown < items.len() {
        out.push_str(&format!("... and {} more {}\n", items.len() - shown, noun));
    }
    out
}

/// Render one series as `name{label="value", ...}`.
pub fn format_series(labels: &BTreeMap<String, String>) -> String {
    let name = labels.get("__name__").map(String::as_str).unwrap_or("");
    let pairs: Vec<String> = labels
        .iter()
        .filter(|(k, _)| k.as_str() != "__name__")
        .map(|(k, v)| format!("{k}={v:?}"))
        .collect();
    format!("{}{{{}}}", name, pairs.join(", "))
}

/// Append a `Warnings:` trailer when Prometheus returned any.
pub fn append_warnings(text: &mut String, warnings: &[String]) {
    if !warnings.is_empty() {
        text.push_str(&format!("\nWarnings: {}", warnings.join("; ")));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
