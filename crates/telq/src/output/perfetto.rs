use std::collections::HashMap;
use std::io::Write;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use telq_core::model::span::SpanEntry;

use super::SpansFormatter;

/// Chrome trace event, loadable by Perfetto and chrome://tracing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraceEvent {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cat: String,
    pub ph: String,
    /// Microseconds since the unix epoch.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub ts: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub dur: i64,
    pub pid: u32,
    pub tid: u32,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub args: Map<String, Value>,
}

fn is_zero(v: &i64) -> bool {
    *v == 0
}

/// Converts spans to a Chrome trace. Each service becomes a process, named by
/// a metadata event and numbered in first-encounter order, and every span
/// becomes a complete ("X") event on that process.
pub fn trace_events(spans: &[SpanEntry]) -> Vec<TraceEvent> {
    let mut pids: HashMap<&str, u32> = HashMap::new();
    let mut events = Vec::new();

    for span in spans {
        let service = span.attributes.service.as_str();
        if !pids.contains_key(service) {
            let pid = pids.len() as u32 + 1;
            pids.insert(service, pid);

            let mut args = Map::new();
            args.insert("name".to_string(), Value::String(service.to_string()));
            events.push(TraceEvent {
                name: "process_name".to_string(),
                cat: String::new(),
                ph: "M".to_string(),
                ts: 0,
                dur: 0,
                pid,
                tid: 0,
                args,
            });
        }
    }

    for span in spans {
        let attrs = &span.attributes;
        let pid = pids[attrs.service.as_str()];

        let mut args = Map::new();
        args.insert("span_id".to_string(), Value::String(attrs.span_id.clone()));
        args.insert(
            "trace_id".to_string(),
            Value::String(attrs.trace_id.clone()),
        );
        args.insert("status".to_string(), Value::String(attrs.status.clone()));
        if !attrs.parent_id.is_empty() {
            args.insert(
                "parent_id".to_string(),
                Value::String(attrs.parent_id.clone()),
            );
        }

        events.push(TraceEvent {
            name: attrs.resource_name.clone(),
            cat: attrs.operation_name.clone(),
            ph: "X".to_string(),
            ts: attrs.start_timestamp.timestamp_micros(),
            dur: attrs.duration_ns() / 1000,
            pid,
            tid: pid,
            args,
        });
    }

    events
}

pub struct PerfettoOutput;

impl SpansFormatter for PerfettoOutput {
    fn write_spans(&self, w: &mut dyn Write, spans: &[SpanEntry]) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(&mut *w, &trace_events(spans))?;
        writeln!(w)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testkit::{sample_spans_response, span_entry};

    use super::*;

    #[test]
    fn services_become_numbered_processes() {
        let spans = sample_spans_response().data;
        let events = trace_events(&spans);

        // Two metadata events first, then one X event per span.
        assert_eq!(events.len(), 4);
        assert_eq!(events[0].ph, "M");
        assert_eq!(events[0].name, "process_name");
        assert_eq!(events[0].pid, 1);
        assert_eq!(events[0].tid, 0);
        assert_eq!(events[0].args["name"], "web-store");
        assert_eq!(events[1].pid, 2);
        assert_eq!(events[1].args["name"], "product-db");

        let root = &events[2];
        assert_eq!(root.ph, "X");
        assert_eq!(root.name, "GET /api/products");
        assert_eq!(root.cat, "http.request");
        assert_eq!(root.dur, 5_000);
        assert_eq!(root.pid, 1);
        assert_eq!(root.tid, 1);

        let child = &events[3];
        assert_eq!(child.pid, 2);
        assert_eq!(child.args["parent_id"], "span-1");
    }

    #[test]
    fn timestamps_convert_to_microseconds() {
        let spans = sample_spans_response().data;
        let events = trace_events(&spans);
        let expected = spans[0].attributes.start_timestamp.timestamp_micros();
        assert_eq!(events[2].ts, expected);
    }

    #[test]
    fn root_span_omits_parent_arg() {
        let events = trace_events(&[span_entry("span-1", "", 0)]);
        let root = &events[1];
        assert!(!root.args.contains_key("parent_id"));
        assert_eq!(root.args["span_id"], "span-1");
        assert_eq!(root.args["trace_id"], "abc123");
        assert_eq!(root.args["status"], "ok");
    }

    #[test]
    fn repeated_services_share_a_pid() {
        let spans = vec![
            span_entry("a", "", 0),
            span_entry("b", "a", 1),
            span_entry("c", "a", 2),
        ];
        let events = trace_events(&spans);
        assert_eq!(events.len(), 4);
        assert!(events[1..].iter().all(|e| e.pid == 1 && e.tid == 1));
    }

    #[test]
    fn empty_input_serializes_to_empty_array() {
        let mut out = Vec::new();
        PerfettoOutput.write_spans(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "[]\n");
    }

    #[test]
    fn events_survive_a_json_round_trip() {
        let spans = sample_spans_response().data;
        let events = trace_events(&spans);
        let encoded = serde_json::to_string(&events).unwrap();
        let decoded: Vec<TraceEvent> = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, events);
    }
}
