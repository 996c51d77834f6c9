use telq_core::query::AggregateCompute;

/// Structured filter flags shared by the log commands.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct FilterArgs {
    /// Restrict to one service.
    #[arg(short = 's', long)]
    pub service: Option<String>,
    /// Restrict to one environment tag.
    #[arg(short = 'e', long)]
    pub env: Option<String>,
    /// Restrict to one host.
    #[arg(long)]
    pub host: Option<String>,
    /// Restrict to one status (error, warn, info, ...).
    #[arg(long)]
    pub status: Option<String>,
}

/// Combines filter flags with a free-form query into one backend search
/// query. With nothing set, matches everything.
pub fn build_query(filters: &FilterArgs, query: Option<&str>) -> String {
    let mut parts = Vec::new();
    if let Some(service) = &filters.service {
        parts.push(format!("service:{service}"));
    }
    if let Some(env) = &filters.env {
        parts.push(format!("env:{env}"));
    }
    if let Some(host) = &filters.host {
        parts.push(format!("host:{host}"));
    }
    if let Some(status) = &filters.status {
        parts.push(format!("status:{status}"));
    }
    if let Some(query) = query {
        let trimmed = query.trim();
        if !trimmed.is_empty() {
            parts.push(trimmed.to_string());
        }
    }

    if parts.is_empty() {
        "*".to_string()
    } else {
        parts.join(" ")
    }
}

/// Parses a compute spec: `count`, or `<aggregation>:<metric>` for avg, sum,
/// min, max, and pct.
pub fn parse_compute(spec: &str) -> anyhow::Result<AggregateCompute> {
    if spec == "count" {
        return Ok(AggregateCompute {
            aggregation: "count".to_string(),
            metric: None,
            kind: "total".to_string(),
        });
    }

    let (aggregation, metric) = match spec.split_once(':') {
        Some((agg, metric)) if !metric.is_empty() => (agg, metric),
        _ => {
            let agg = spec.split(':').next().unwrap_or(spec);
            anyhow::bail!("aggregation {agg:?} requires a metric (e.g. {agg}:@duration)");
        }
    };

    match aggregation {
        "avg" | "sum" | "min" | "max" | "pct" => Ok(AggregateCompute {
            aggregation: aggregation.to_string(),
            metric: Some(metric.to_string()),
            kind: "total".to_string(),
        }),
        other => anyhow::bail!("unknown aggregation {other:?} (use count, avg, sum, min, max, or pct)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_joins_filters_and_free_text() {
        let filters = FilterArgs {
            service: Some("payment".to_string()),
            env: Some("prod".to_string()),
            host: None,
            status: Some("error".to_string()),
        };
        assert_eq!(
            build_query(&filters, Some("timeout")),
            "service:payment env:prod status:error timeout"
        );
    }

    #[test]
    fn empty_query_matches_everything() {
        assert_eq!(build_query(&FilterArgs::default(), None), "*");
        assert_eq!(build_query(&FilterArgs::default(), Some("   ")), "*");
    }

    #[test]
    fn free_text_alone_passes_through() {
        assert_eq!(
            build_query(&FilterArgs::default(), Some("timeout retry")),
            "timeout retry"
        );
    }

    #[test]
    fn count_needs_no_metric() {
        let compute = parse_compute("count").unwrap();
        assert_eq!(compute.aggregation, "count");
        assert_eq!(compute.metric, None);
        assert_eq!(compute.kind, "total");
    }

    #[test]
    fn metric_aggregations_require_a_metric() {
        let compute = parse_compute("avg:@duration").unwrap();
        assert_eq!(compute.aggregation, "avg");
        assert_eq!(compute.metric.as_deref(), Some("@duration"));

        let err = parse_compute("avg").unwrap_err();
        assert!(err.to_string().contains("requires a metric"));
        assert!(parse_compute("max:").is_err());
    }

    #[test]
    fn unknown_aggregations_are_rejected() {
        let err = parse_compute("median:@duration").unwrap_err();
        assert!(err.to_string().contains("unknown aggregation"));
    }
}
