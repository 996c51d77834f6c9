use std::io::Write;

use serde::Serialize;
use telq_core::model::aggregate::AggregateBucket;
use telq_core::model::log::LogEntry;
use telq_core::model::span::SpanEntry;

use super::{AggregateFormatter, LogsFormatter, SpansFormatter};

/// Pretty-printed JSON array of the fetched records, as the backend shaped
/// them. The machine-friendly default.
pub struct JsonOutput;

fn write_pretty<T: Serialize>(w: &mut dyn Write, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *w, value)?;
    writeln!(w)?;
    Ok(())
}

impl LogsFormatter for JsonOutput {
    fn write_logs(&self, w: &mut dyn Write, entries: &[LogEntry]) -> anyhow::Result<()> {
        write_pretty(w, &entries)
    }
}

impl SpansFormatter for JsonOutput {
    fn write_spans(&self, w: &mut dyn Write, spans: &[SpanEntry]) -> anyhow::Result<()> {
        write_pretty(w, &spans)
    }
}

impl AggregateFormatter for JsonOutput {
    fn write_buckets(&self, w: &mut dyn Write, buckets: &[AggregateBucket]) -> anyhow::Result<()> {
        write_pretty(w, &buckets)
    }
}

#[cfg(test)]
mod tests {
    use testkit::sample_logs_response;

    use super::*;

    #[test]
    fn logs_render_as_pretty_array() {
        let entries = sample_logs_response().data;
        let mut out = Vec::new();
        JsonOutput.write_logs(&mut out, &entries).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("[\n"));
        assert!(text.ends_with("]\n"));
        assert!(text.contains("payment failed: insufficient funds"));
    }

    #[test]
    fn empty_input_renders_as_empty_array() {
        let mut out = Vec::new();
        JsonOutput.write_logs(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "[]\n");
    }
}
