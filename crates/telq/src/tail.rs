use std::io::Write;
use std::time::Duration;

use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;
use telq_api::client::LogsApi;
use telq_api::fetch_logs_limited;
use telq_core::Result;
use telq_core::model::log::LogEntry;
use telq_core::query::LogSearchParams;

use crate::output::LogsFormatter;

const TAIL_PAGE_LIMIT: usize = 100;

/// Tracks how far the tail loop has read. `last_id` suppresses the boundary
/// record: the next poll starts exactly at `last_seen`, so the record emitted
/// last time comes back again.
pub struct TailCursor {
    last_seen: DateTime<Utc>,
    last_id: String,
}

impl TailCursor {
    pub fn start(now: DateTime<Utc>) -> Self {
        Self {
            last_seen: now,
            last_id: String::new(),
        }
    }

    fn filter_new(&self, entries: Vec<LogEntry>) -> Vec<LogEntry> {
        entries
            .into_iter()
            .filter(|entry| entry.id != self.last_id)
            .collect()
    }

    /// Moves the cursor to the newest emitted record. An empty poll leaves it
    /// alone so the next window re-covers the same range.
    fn advance(&mut self, emitted: &[LogEntry]) {
        if let Some(last) = emitted.last() {
            self.last_seen = last.attributes.timestamp;
            self.last_id = last.id.clone();
        }
    }
}

/// One poll: fetch everything between the cursor and `now` in ascending
/// order, drop the boundary record, advance the cursor past what came back.
pub async fn poll_once<C: LogsApi>(
    client: &C,
    cursor: &mut TailCursor,
    query: &str,
    now: DateTime<Utc>,
) -> Result<Vec<LogEntry>> {
    let params = LogSearchParams {
        query: query.to_string(),
        from: cursor.last_seen,
        to: now,
        sort: "timestamp".to_string(),
        limit: TAIL_PAGE_LIMIT,
        cursor: String::new(),
        indexes: Vec::new(),
    };

    let fetched = fetch_logs_limited(client, params, TAIL_PAGE_LIMIT).await?;
    let emitted = cursor.filter_new(fetched);
    cursor.advance(&emitted);
    Ok(emitted)
}

pub async fn run<C: LogsApi>(
    client: &C,
    query: &str,
    interval: Duration,
    formatter: &dyn LogsFormatter,
) -> anyhow::Result<()> {
    eprintln!("Tailing logs matching {query:?} (Ctrl+C to stop)...");

    let mut cursor = TailCursor::start(Utc::now());
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::debug!("received ctrl-c, stopping tail");
                return Ok(());
            }
            _ = ticker.tick() => {
                match poll_once(client, &mut cursor, query, Utc::now()).await {
                    Ok(emitted) if !emitted.is_empty() => {
                        let stdout = std::io::stdout();
                        let mut lock = stdout.lock();
                        formatter.write_logs(&mut lock, &emitted)?;
                        lock.flush()?;
                    }
                    Ok(_) => {}
                    Err(err) => eprintln!("{}", format!("poll failed: {err}").red()),
                }
            }
        }
    }
}
