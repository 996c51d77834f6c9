use std::io::Write;

use telq_core::model::aggregate::AggregateBucket;
use telq_core::model::log::LogEntry;
use telq_core::model::span::SpanEntry;

use super::{AggregateFormatter, LogsFormatter, SpansFormatter};

/// One record per line. Logs print their message verbatim; spans and buckets
/// print compact JSON so the stream stays greppable.
pub struct RawOutput;

impl LogsFormatter for RawOutput {
    fn write_logs(&self, w: &mut dyn Write, entries: &[LogEntry]) -> anyhow::Result<()> {
        for entry in entries {
            writeln!(w, "{}", entry.attributes.message)?;
        }
        Ok(())
    }
}

impl SpansFormatter for RawOutput {
    fn write_spans(&self, w: &mut dyn Write, spans: &[SpanEntry]) -> anyhow::Result<()> {
        for span in spans {
            writeln!(w, "{}", serde_json::to_string(span)?)?;
        }
        Ok(())
    }
}

impl AggregateFormatter for RawOutput {
    fn write_buckets(&self, w: &mut dyn Write, buckets: &[AggregateBucket]) -> anyhow::Result<()> {
        for bucket in buckets {
            writeln!(w, "{}", serde_json::to_string(bucket)?)?;
        }
        Ok(())
    }
}
