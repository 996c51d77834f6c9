use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use telq_core::config::Config;
use telq_core::query::{
    AggregateCompute, AggregateGroupBy, AggregateParams, AggregateResponse, LogSearchParams,
    LogSearchResponse, SpanSearchParams, SpanSearchResponse,
};
use telq_core::{Result, TelqError};

/// Page size used when the caller asks for zero records per page.
pub const DEFAULT_PAGE_LIMIT: usize = 50;
/// Hard per-page ceiling enforced by the backend.
pub const MAX_PAGE_LIMIT: usize = 1000;

/// Log search and aggregation capability. Implemented by [`Client`] and by
/// test doubles.
#[allow(async_fn_in_trait)]
pub trait LogsApi {
    async fn search_logs(&self, params: &LogSearchParams) -> Result<LogSearchResponse>;
    async fn aggregate_logs(&self, params: &AggregateParams) -> Result<AggregateResponse>;
}

/// Span search capability.
#[allow(async_fn_in_trait)]
pub trait SpansApi {
    async fn search_spans(&self, params: &SpanSearchParams) -> Result<SpanSearchResponse>;
}

/// HTTP client for the remote analytics backend.
#[derive(Debug, Clone)]
pub struct Client {
    endpoint: String,
    api_key: String,
    app_key: String,
    http: reqwest::Client,
}

impl Client {
    pub fn new(endpoint: &str, api_key: &str, app_key: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| TelqError::Fetch(format!("building http client: {e}")))?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            app_key: app_key.to_string(),
            http,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(&cfg.endpoint, &cfg.api_key, &cfg.app_key)
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let url = format!("{}{path}", self.endpoint);
        tracing::debug!(%url, "issuing search request");

        let resp = self
            .http
            .post(&url)
            .header("X-Api-Key", &self.api_key)
            .header("X-Application-Key", &self.app_key)
            .json(body)
            .send()
            .await
            .map_err(|e| TelqError::Fetch(format!("executing request: {e}")))?;

        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| TelqError::Fetch(format!("reading response body: {e}")))?;
        tracing::debug!(status = status.as_u16(), bytes = bytes.len(), "response received");

        if status.is_client_error() || status.is_server_error() {
            return Err(api_error(status.as_u16(), &bytes));
        }

        serde_json::from_slice(&bytes)
            .map_err(|e| TelqError::Decode(format!("decoding response: {e}")))
    }
}

/// Builds a fetch error from a non-2xx response, picking up the backend's
/// `errors` list when the body carries one.
fn api_error(status: u16, body: &[u8]) -> TelqError {
    let detail = serde_json::from_slice::<Value>(body)
        .ok()
        .as_ref()
        .and_then(|v| v.get("errors"))
        .and_then(Value::as_array)
        .and_then(|errs| errs.first())
        .and_then(Value::as_str)
        .map(str::to_string);

    match detail {
        Some(msg) => TelqError::Fetch(format!("backend error ({status}): {msg}")),
        None => TelqError::Fetch(format!("backend error ({status})")),
    }
}

fn clamp_page_limit(limit: usize) -> usize {
    if limit == 0 {
        DEFAULT_PAGE_LIMIT
    } else {
        limit.min(MAX_PAGE_LIMIT)
    }
}

fn rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

// Request body shapes matching the backend API schema.

#[derive(Serialize)]
struct SearchFilter<'a> {
    query: &'a str,
    from: String,
    to: String,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    indexes: &'a [String],
}

#[derive(Serialize)]
struct SearchPage<'a> {
    limit: usize,
    #[serde(skip_serializing_if = "str::is_empty")]
    cursor: &'a str,
}

#[derive(Serialize)]
struct LogSearchBody<'a> {
    filter: SearchFilter<'a>,
    sort: &'a str,
    page: SearchPage<'a>,
}

#[derive(Serialize)]
struct AggregateBody<'a> {
    compute: &'a [AggregateCompute],
    filter: SearchFilter<'a>,
    #[serde(skip_serializing_if = "<[AggregateGroupBy]>::is_empty")]
    group_by: &'a [AggregateGroupBy],
}

#[derive(Serialize)]
struct SpanSearchBody<'a> {
    data: SpanSearchData<'a>,
}

#[derive(Serialize)]
struct SpanSearchData<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    attributes: SpanSearchAttrs<'a>,
}

#[derive(Serialize)]
struct SpanSearchAttrs<'a> {
    filter: SearchFilter<'a>,
    sort: &'a str,
    page: SearchPage<'a>,
}

impl LogsApi for Client {
    async fn search_logs(&self, params: &LogSearchParams) -> Result<LogSearchResponse> {
        let sort = if params.sort.is_empty() {
            "-timestamp"
        } else {
            &params.sort
        };

        let body = LogSearchBody {
            filter: SearchFilter {
                query: &params.query,
                from: rfc3339(params.from),
                to: rfc3339(params.to),
                indexes: &params.indexes,
            },
            sort,
            page: SearchPage {
                limit: clamp_page_limit(params.limit),
                cursor: &params.cursor,
            },
        };

        self.post("/api/v2/logs/events/search", &body).await
    }

    async fn aggregate_logs(&self, params: &AggregateParams) -> Result<AggregateResponse> {
        let body = AggregateBody {
            compute: &params.compute,
            filter: SearchFilter {
                query: &params.query,
                from: rfc3339(params.from),
                to: rfc3339(params.to),
                indexes: &[],
            },
            group_by: &params.group_by,
        };

        self.post("/api/v2/logs/analytics/aggregate", &body).await
    }
}

impl SpansApi for Client {
    async fn search_spans(&self, params: &SpanSearchParams) -> Result<SpanSearchResponse> {
        let sort = if params.sort.is_empty() {
            "timestamp"
        } else {
            &params.sort
        };

        let body = SpanSearchBody {
            data: SpanSearchData {
                kind: "search_request",
                attributes: SpanSearchAttrs {
                    filter: SearchFilter {
                        query: &params.query,
                        from: rfc3339(params.from),
                        to: rfc3339(params.to),
                        indexes: &[],
                    },
                    sort,
                    page: SearchPage {
                        limit: clamp_page_limit(params.limit),
                        cursor: &params.cursor,
                    },
                },
            },
        };

        self.post("/api/v2/spans/events/search", &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_limit_defaults_and_clamps() {
        assert_eq!(clamp_page_limit(0), 50);
        assert_eq!(clamp_page_limit(25), 25);
        assert_eq!(clamp_page_limit(1000), 1000);
        assert_eq!(clamp_page_limit(5000), 1000);
    }

    #[test]
    fn api_error_picks_up_backend_detail() {
        let err = api_error(403, br#"{"errors": ["Forbidden", "other"]}"#);
        assert_eq!(err.to_string(), "fetch error: backend error (403): Forbidden");

        let err = api_error(500, b"not json");
        assert_eq!(err.to_string(), "fetch error: backend error (500)");
    }

    #[test]
    fn log_search_body_serializes_wire_shape() {
        use chrono::TimeZone;

        let params = LogSearchParams {
            query: "service:payment".to_string(),
            from: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            to: Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap(),
            sort: "-timestamp".to_string(),
            limit: 50,
            cursor: String::new(),
            indexes: Vec::new(),
        };

        let body = LogSearchBody {
            filter: SearchFilter {
                query: &params.query,
                from: rfc3339(params.from),
                to: rfc3339(params.to),
                indexes: &params.indexes,
            },
            sort: &params.sort,
            page: SearchPage {
                limit: clamp_page_limit(params.limit),
                cursor: &params.cursor,
            },
        };

        let encoded = serde_json::to_value(&body).unwrap();
        assert_eq!(encoded["filter"]["query"], "service:payment");
        assert_eq!(encoded["filter"]["from"], "2025-01-01T00:00:00Z");
        assert_eq!(encoded["sort"], "-timestamp");
        assert_eq!(encoded["page"]["limit"], 50);
        // Empty cursor and indexes are omitted entirely.
        assert!(encoded["page"].get("cursor").is_none());
        assert!(encoded["filter"].get("indexes").is_none());
    }
}
