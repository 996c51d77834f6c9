mod json;
mod perfetto;
mod raw;
mod table;

use std::io::Write;
use std::str::FromStr;

use telq_core::model::aggregate::AggregateBucket;
use telq_core::model::log::LogEntry;
use telq_core::model::span::SpanEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Table,
    Raw,
    Perfetto,
}

impl FromStr for Format {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "table" => Ok(Self::Table),
            "raw" => Ok(Self::Raw),
            "perfetto" => Ok(Self::Perfetto),
            other => anyhow::bail!(
                "unknown output format {other:?} (use json, table, raw, or perfetto)"
            ),
        }
    }
}

pub trait LogsFormatter {
    fn write_logs(&self, w: &mut dyn Write, entries: &[LogEntry]) -> anyhow::Result<()>;
}

pub trait SpansFormatter {
    fn write_spans(&self, w: &mut dyn Write, spans: &[SpanEntry]) -> anyhow::Result<()>;
}

pub trait AggregateFormatter {
    fn write_buckets(&self, w: &mut dyn Write, buckets: &[AggregateBucket]) -> anyhow::Result<()>;
}

pub fn logs_formatter(format: Format) -> anyhow::Result<Box<dyn LogsFormatter>> {
    match format {
        Format::Json => Ok(Box::new(json::JsonOutput)),
        Format::Table => Ok(Box::new(table::TableOutput)),
        Format::Raw => Ok(Box::new(raw::RawOutput)),
        Format::Perfetto => anyhow::bail!("perfetto output is only available for traces"),
    }
}

pub fn aggregate_formatter(format: Format) -> anyhow::Result<Box<dyn AggregateFormatter>> {
    match format {
        Format::Json => Ok(Box::new(json::JsonOutput)),
        Format::Table => Ok(Box::new(table::TableOutput)),
        Format::Raw => Ok(Box::new(raw::RawOutput)),
        Format::Perfetto => anyhow::bail!("perfetto output is only available for traces"),
    }
}

pub fn spans_formatter(format: Format) -> anyhow::Result<Box<dyn SpansFormatter>> {
    match format {
        Format::Json => Ok(Box::new(json::JsonOutput)),
        Format::Table => Ok(Box::new(table::TableOutput)),
        Format::Raw => Ok(Box::new(raw::RawOutput)),
        Format::Perfetto => Ok(Box::new(perfetto::PerfettoOutput)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parses_known_names() {
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("table".parse::<Format>().unwrap(), Format::Table);
        assert_eq!("raw".parse::<Format>().unwrap(), Format::Raw);
        assert_eq!("perfetto".parse::<Format>().unwrap(), Format::Perfetto);

        let err = "yaml".parse::<Format>().unwrap_err();
        assert!(err.to_string().contains("unknown output format"));
    }

    #[test]
    fn perfetto_is_traces_only() {
        assert!(logs_formatter(Format::Perfetto).is_err());
        assert!(aggregate_formatter(Format::Perfetto).is_err());
        assert!(spans_formatter(Format::Perfetto).is_ok());
    }
}
