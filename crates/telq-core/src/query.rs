use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::aggregate::AggregateBucket;
use crate::model::log::LogEntry;
use crate::model::span::SpanEntry;

/// Parameters for one log search call. `cursor` is threaded between pages by
/// the paginated fetcher; an empty string requests the first page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogSearchParams {
    pub query: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    /// `-timestamp` (newest first, the backend default) or `timestamp`.
    pub sort: String,
    pub limit: usize,
    pub cursor: String,
    pub indexes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpanSearchParams {
    pub query: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    /// `timestamp` (oldest first, the backend default) or `-timestamp`.
    pub sort: String,
    pub limit: usize,
    pub cursor: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AggregateParams {
    pub query: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub compute: Vec<AggregateCompute>,
    pub group_by: Vec<AggregateGroupBy>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AggregateCompute {
    /// count, avg, sum, min, max, pct.
    pub aggregation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AggregateGroupBy {
    pub facet: String,
    pub limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<AggregateGroupSort>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AggregateGroupSort {
    pub aggregation: String,
    /// `asc` or `desc`.
    pub order: String,
}

/// Response envelope for log search, mirroring the backend wire shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LogSearchResponse {
    #[serde(default)]
    pub data: Vec<LogEntry>,
    #[serde(default)]
    pub meta: ResponseMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SpanSearchResponse {
    #[serde(default)]
    pub data: Vec<SpanEntry>,
    #[serde(default)]
    pub meta: ResponseMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ResponseMeta {
    #[serde(default)]
    pub page: PageCursor,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub elapsed: i64,
}

/// Resumption cursor for the next page. Empty `after` means no more pages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PageCursor {
    #[serde(default)]
    pub after: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AggregateResponse {
    #[serde(default)]
    pub data: AggregateData,
    #[serde(default)]
    pub meta: AggregateMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AggregateData {
    #[serde(default)]
    pub buckets: Vec<AggregateBucket>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AggregateMeta {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub elapsed: i64,
}
