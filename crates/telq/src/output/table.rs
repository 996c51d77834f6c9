use std::io::Write;

use telq_core::model::aggregate::AggregateBucket;
use telq_core::model::log::LogEntry;
use telq_core::model::span::SpanEntry;
use telq_core::tree::build_span_tree;

use super::{AggregateFormatter, LogsFormatter, SpansFormatter};

const MESSAGE_WIDTH: usize = 100;
const RESOURCE_WIDTH: usize = 60;

/// Aligned columns for terminal reading. Spans render as an indented tree
/// ordered by start time.
pub struct TableOutput;

impl LogsFormatter for TableOutput {
    fn write_logs(&self, w: &mut dyn Write, entries: &[LogEntry]) -> anyhow::Result<()> {
        let rows: Vec<Vec<String>> = entries
            .iter()
            .map(|entry| {
                let attrs = &entry.attributes;
                vec![
                    attrs.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                    attrs.status.clone(),
                    attrs.service.clone(),
                    attrs.host.clone(),
                    truncate(&attrs.message, MESSAGE_WIDTH).replace('\n', " "),
                ]
            })
            .collect();

        write_table(
            w,
            &["TIMESTAMP", "STATUS", "SERVICE", "HOST", "MESSAGE"],
            &rows,
        )?;
        writeln!(w, "({} results)", entries.len())?;
        Ok(())
    }
}

impl SpansFormatter for TableOutput {
    fn write_spans(&self, w: &mut dyn Write, spans: &[SpanEntry]) -> anyhow::Result<()> {
        if spans.is_empty() {
            writeln!(w, "(no spans found)")?;
            return Ok(());
        }

        let tree = build_span_tree(spans);
        let mut rows = Vec::new();
        tree.walk(|span, depth| {
            let attrs = &span.attributes;
            rows.push(vec![
                format!("{}{}", "  ".repeat(depth), attrs.service),
                truncate(&attrs.resource_name, RESOURCE_WIDTH),
                attrs.operation_name.clone(),
                format_duration(attrs.duration_ns()),
                attrs.span_id.clone(),
            ]);
        });

        write_table(
            w,
            &["SERVICE", "RESOURCE", "TYPE", "DURATION", "SPAN_ID"],
            &rows,
        )?;
        writeln!(w, "({} spans)", spans.len())?;
        Ok(())
    }
}

impl AggregateFormatter for TableOutput {
    fn write_buckets(&self, w: &mut dyn Write, buckets: &[AggregateBucket]) -> anyhow::Result<()> {
        let Some(first) = buckets.first() else {
            writeln!(w, "(no results)")?;
            return Ok(());
        };

        // Column order comes from the first bucket: group keys, then computes.
        let mut headers: Vec<String> = first.by.keys().cloned().collect();
        headers.extend(first.computes.keys().cloned());
        let header_refs: Vec<&str> = headers.iter().map(String::as_str).collect();

        let rows: Vec<Vec<String>> = buckets
            .iter()
            .map(|bucket| {
                let mut row = Vec::with_capacity(headers.len());
                for key in first.by.keys() {
                    row.push(bucket.by.get(key).map(render_value).unwrap_or_default());
                }
                for key in first.computes.keys() {
                    row.push(bucket.computes.get(key).map(render_value).unwrap_or_default());
                }
                row
            })
            .collect();

        write_table(w, &header_refs, &rows)?;
        writeln!(w, "({} results)", buckets.len())?;
        Ok(())
    }
}

fn write_table(w: &mut dyn Write, headers: &[&str], rows: &[Vec<String>]) -> anyhow::Result<()> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let separators: Vec<String> = headers
        .iter()
        .map(|h| "-".repeat(h.chars().count()))
        .collect();

    write_row(w, headers.iter().map(|h| *h), &widths)?;
    write_row(w, separators.iter().map(String::as_str), &widths)?;
    for row in rows {
        write_row(w, row.iter().map(String::as_str), &widths)?;
    }
    Ok(())
}

fn write_row<'a>(
    w: &mut dyn Write,
    cells: impl Iterator<Item = &'a str>,
    widths: &[usize],
) -> anyhow::Result<()> {
    let cells: Vec<&str> = cells.collect();
    let last = cells.len().saturating_sub(1);
    for (i, cell) in cells.iter().enumerate() {
        if i == last {
            // Last column stays unpadded so lines carry no trailing spaces.
            writeln!(w, "{cell}")?;
        } else {
            write!(w, "{cell:<width$}  ", width = widths[i])?;
        }
    }
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let cut: String = s.chars().take(max).collect();
    format!("{cut}...")
}

fn render_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

pub fn format_duration(ns: i64) -> String {
    if ns < 1000 {
        return format!("{ns}ns");
    }
    let us = ns as f64 / 1000.0;
    if us < 1000.0 {
        return format!("{us:.0}us");
    }
    let ms = us / 1000.0;
    if ms < 1000.0 {
        return format!("{ms:.1}ms");
    }
    let s = ms / 1000.0;
    if s < 60.0 {
        return format!("{s:.2}s");
    }
    format!("{:.1}m", s / 60.0)
}
