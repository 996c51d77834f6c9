pub mod client;
pub mod paginate;

pub use client::{Client, LogsApi, SpansApi};
pub use paginate::{fetch_logs_limited, fetch_spans_exhaustive};
