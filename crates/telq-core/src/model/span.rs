use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One trace span as returned by the backend search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpanEntry {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub attributes: SpanAttributes,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpanAttributes {
    pub start_timestamp: DateTime<Utc>,
    pub end_timestamp: DateTime<Utc>,
    #[serde(default)]
    pub trace_id: String,
    #[serde(default)]
    pub span_id: String,
    /// Empty string means the span has no known parent.
    #[serde(default)]
    pub parent_id: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub resource_name: String,
    #[serde(default)]
    pub operation_name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub custom: Map<String, Value>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl SpanAttributes {
    /// Span duration in nanoseconds, read from the `duration` field of the
    /// custom attribute map. 0 when the field is absent or non-numeric.
    pub fn duration_ns(&self) -> i64 {
        self.custom
            .get("duration")
            .and_then(Value::as_f64)
            .map(|f| f as i64)
            .unwrap_or(0)
    }
}
