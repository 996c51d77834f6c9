use telq_core::Result;
use telq_core::model::log::LogEntry;
use telq_core::model::span::SpanEntry;
use telq_core::query::{LogSearchParams, SpanSearchParams};

use crate::client::{LogsApi, MAX_PAGE_LIMIT, SpansApi};

/// Count-bounded pagination: drives repeated search calls until `limit`
/// records have accumulated, the backend reports no resumption cursor, or a
/// page comes back empty. Each page requests at most min(remaining, 1000)
/// records. A page failure aborts the whole fetch with no partial result.
pub async fn fetch_logs_limited<C: LogsApi>(
    client: &C,
    mut params: LogSearchParams,
    limit: usize,
) -> Result<Vec<LogEntry>> {
    let mut entries = Vec::new();
    let mut remaining = limit;

    loop {
        params.limit = remaining.min(MAX_PAGE_LIMIT);
        let resp = client.search_logs(&params).await?;

        let page_len = resp.data.len();
        entries.extend(resp.data);
        remaining = remaining.saturating_sub(page_len);

        if resp.meta.page.after.is_empty() || remaining == 0 || page_len == 0 {
            break;
        }
        params.cursor = resp.meta.page.after;
    }

    Ok(entries)
}

/// Exhaustive pagination: ignores any target count and keeps requesting pages
/// until the cursor runs out. Used where a partial record set would be
/// misleading, such as fetching every span of one trace.
pub async fn fetch_spans_exhaustive<C: SpansApi>(
    client: &C,
    mut params: SpanSearchParams,
) -> Result<Vec<SpanEntry>> {
    let mut spans = Vec::new();

    loop {
        let resp = client.search_spans(&params).await?;

        let page_len = resp.data.len();
        spans.extend(resp.data);

        if resp.meta.page.after.is_empty() || page_len == 0 {
            break;
        }
        params.cursor = resp.meta.page.after;
    }

    Ok(spans)
}
