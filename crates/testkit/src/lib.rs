//! Shared fixtures for exercising the fetcher and renderers without a
//! backend.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{Map, Value, json};
use telq_core::model::aggregate::AggregateBucket;
use telq_core::model::log::{LogAttributes, LogEntry};
use telq_core::model::span::{SpanAttributes, SpanEntry};
use telq_core::query::{
    AggregateData, AggregateMeta, AggregateResponse, LogSearchResponse, PageCursor, ResponseMeta,
    SpanSearchResponse,
};

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, 10, 30, 0).unwrap()
}

/// Minimal log entry with distinct id and message, fixed everything else.
pub fn log_entry(id: &str, message: &str) -> LogEntry {
    LogEntry {
        id: id.to_string(),
        kind: "log".to_string(),
        attributes: LogAttributes {
            timestamp: base_time(),
            status: "info".to_string(),
            service: "web-store".to_string(),
            host: "web-1".to_string(),
            message: message.to_string(),
            attributes: Map::new(),
            tags: Vec::new(),
        },
    }
}

/// Minimal span entry; `parent_id` empty means root, `start_offset_ms`
/// shifts the start timestamp so ordering is observable.
pub fn span_entry(id: &str, parent_id: &str, start_offset_ms: i64) -> SpanEntry {
    let start = base_time() + Duration::milliseconds(start_offset_ms);
    SpanEntry {
        id: id.to_string(),
        kind: "spans".to_string(),
        attributes: SpanAttributes {
            start_timestamp: start,
            end_timestamp: start + Duration::milliseconds(5),
            trace_id: "abc123".to_string(),
            span_id: id.to_string(),
            parent_id: parent_id.to_string(),
            service: "web-store".to_string(),
            resource_name: format!("resource for {id}"),
            operation_name: "http.request".to_string(),
            status: "ok".to_string(),
            custom: Map::new(),
            tags: Vec::new(),
        },
    }
}

/// Two logs from different services, the first an error.
pub fn sample_logs_response() -> LogSearchResponse {
    let mut payment = log_entry("log-1", "payment failed: insufficient funds");
    payment.attributes.status = "error".to_string();
    payment.attributes.service = "payment".to_string();

    let mut web = log_entry("log-2", "request completed");
    web.attributes.timestamp = base_time() + Duration::seconds(1);

    LogSearchResponse {
        data: vec![payment, web],
        meta: ResponseMeta {
            page: PageCursor {
                after: String::new(),
            },
            status: "done".to_string(),
            elapsed: 12,
        },
    }
}

/// A two-span trace: an HTTP request with a database query under it.
pub fn sample_spans_response() -> SpanSearchResponse {
    let mut root = span_entry("span-1", "", 0);
    root.attributes.resource_name = "GET /api/products".to_string();
    root.attributes
        .custom
        .insert("duration".to_string(), json!(5_000_000));

    let mut child = span_entry("span-2", "span-1", 1);
    child.attributes.service = "product-db".to_string();
    child.attributes.resource_name = "SELECT products".to_string();
    child.attributes.operation_name = "postgres.query".to_string();
    child
        .attributes
        .custom
        .insert("duration".to_string(), json!(2_000_000));

    SpanSearchResponse {
        data: vec![root, child],
        meta: ResponseMeta::default(),
    }
}

/// Per-service event counts, as `telq logs aggregate` would receive them.
pub fn sample_aggregate_response() -> AggregateResponse {
    let bucket = |service: &str, count: i64| {
        let mut by = Map::new();
        by.insert("service".to_string(), Value::String(service.to_string()));
        let mut computes = Map::new();
        computes.insert("c0".to_string(), json!(count));
        AggregateBucket { by, computes }
    };

    AggregateResponse {
        data: AggregateData {
            buckets: vec![bucket("payment", 142), bucket("web-store", 89)],
        },
        meta: AggregateMeta {
            status: "done".to_string(),
            elapsed: 8,
        },
    }
}
