mod output;
mod query;
mod tail;

use std::io::IsTerminal;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use telq_api::{Client, LogsApi, fetch_logs_limited, fetch_spans_exhaustive};
use telq_core::config::Config;
use telq_core::query::{
    AggregateCompute, AggregateGroupBy, AggregateGroupSort, AggregateParams, LogSearchParams,
    SpanSearchParams,
};
use telq_core::time::parse_time_or_relative;

use crate::output::Format;
use crate::query::{FilterArgs, build_query, parse_compute};

#[derive(Parser, Debug)]
#[command(name = "telq")]
#[command(about = "Query a remote telemetry backend for logs and traces")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(subcommand, about = "Search, aggregate, or tail log events")]
    Logs(LogsCommand),
    #[command(subcommand, about = "Inspect traces")]
    Traces(TracesCommand),
    #[command(about = "Write the backend endpoint and keys to the config file")]
    Configure {
        #[arg(long)]
        endpoint: Option<String>,
        #[arg(long)]
        api_key: Option<String>,
        #[arg(long)]
        app_key: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum LogsCommand {
    #[command(about = "Search log events in a time window")]
    Search {
        query: Option<String>,
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, default_value = "15m", help = "Window start (relative like 15m, or a timestamp)")]
        from: String,
        #[arg(long, default_value = "now")]
        to: String,
        #[arg(long, default_value_t = 50)]
        limit: usize,
        #[arg(long, default_value = "-timestamp")]
        sort: String,
        #[arg(long, value_delimiter = ',')]
        indexes: Vec<String>,
        #[arg(short = 'o', long, default_value = "json")]
        output: Format,
    },
    #[command(about = "Aggregate log events into grouped computes")]
    Aggregate {
        query: Option<String>,
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, default_value = "1h")]
        from: String,
        #[arg(long, default_value = "now")]
        to: String,
        #[arg(long, default_value = "count", help = "count, or avg/sum/min/max/pct:<metric>")]
        compute: Vec<String>,
        #[arg(long = "group-by")]
        group_by: Vec<String>,
        #[arg(long, default_value_t = 10, help = "Bucket cap per group-by facet")]
        group_limit: usize,
        #[arg(short = 'o', long, default_value = "json")]
        output: Format,
    },
    #[command(about = "Poll for new log events and stream them")]
    Tail {
        query: Option<String>,
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, default_value = "5s", value_parser = humantime::parse_duration)]
        interval: Duration,
        #[arg(short = 'o', long, default_value = "raw")]
        output: Format,
    },
}

#[derive(Subcommand, Debug)]
enum TracesCommand {
    #[command(about = "Fetch every span of one trace")]
    Get {
        trace_id: String,
        #[arg(long, default_value = "1h")]
        from: String,
        #[arg(long, default_value = "now")]
        to: String,
        #[arg(short = 'o', long, default_value = "json")]
        output: Format,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Logs(LogsCommand::Search {
            query,
            filters,
            from,
            to,
            limit,
            sort,
            indexes,
            output,
        }) => {
            let client = backend_client()?;
            let (from, to) = resolve_window(&from, &to)?;
            let params = LogSearchParams {
                query: build_query(&filters, query.as_deref()),
                from,
                to,
                sort,
                limit,
                cursor: String::new(),
                indexes,
            };

            let entries = fetch_logs_limited(&client, params, limit).await?;
            let formatter = output::logs_formatter(output)?;
            let stdout = std::io::stdout();
            formatter.write_logs(&mut stdout.lock(), &entries)
        }
        Commands::Logs(LogsCommand::Aggregate {
            query,
            filters,
            from,
            to,
            compute,
            group_by,
            group_limit,
            output,
        }) => {
            let client = backend_client()?;
            let (from, to) = resolve_window(&from, &to)?;
            let compute: Vec<AggregateCompute> = compute
                .iter()
                .map(|spec| parse_compute(spec))
                .collect::<anyhow::Result<_>>()?;

            // Buckets sort descending on the first compute.
            let bucket_sort = compute.first().map(|c| AggregateGroupSort {
                aggregation: c.aggregation.clone(),
                order: "desc".to_string(),
            });
            let group_by = group_by
                .into_iter()
                .map(|facet| AggregateGroupBy {
                    facet,
                    limit: group_limit,
                    sort: bucket_sort.clone(),
                })
                .collect();

            let params = AggregateParams {
                query: build_query(&filters, query.as_deref()),
                from,
                to,
                compute,
                group_by,
            };

            let resp = client.aggregate_logs(&params).await?;
            let formatter = output::aggregate_formatter(output)?;
            let stdout = std::io::stdout();
            formatter.write_buckets(&mut stdout.lock(), &resp.data.buckets)
        }
        Commands::Logs(LogsCommand::Tail {
            query,
            filters,
            interval,
            output,
        }) => {
            let client = backend_client()?;
            let query = build_query(&filters, query.as_deref());
            let formatter = output::logs_formatter(output)?;
            tail::run(&client, &query, interval, formatter.as_ref()).await
        }
        Commands::Traces(TracesCommand::Get {
            trace_id,
            from,
            to,
            output,
        }) => {
            let client = backend_client()?;
            let (from, to) = resolve_window(&from, &to)?;
            let params = SpanSearchParams {
                query: format!("trace_id:{trace_id}"),
                from,
                to,
                sort: "timestamp".to_string(),
                limit: 1000,
                cursor: String::new(),
            };

            let spans = fetch_spans_exhaustive(&client, params).await?;
            let formatter = output::spans_formatter(output)?;
            let stdout = std::io::stdout();
            formatter.write_spans(&mut stdout.lock(), &spans)
        }
        Commands::Configure {
            endpoint,
            api_key,
            app_key,
        } => {
            let mut cfg = Config::load()?;
            if let Some(v) = endpoint {
                cfg.endpoint = v;
            }
            if let Some(v) = api_key {
                cfg.api_key = v;
            }
            if let Some(v) = app_key {
                cfg.app_key = v;
            }
            cfg.save().context("write config file")?;
            println!("Configuration saved successfully.");
            Ok(())
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

fn backend_client() -> anyhow::Result<Client> {
    let cfg = Config::load().context("load configuration")?;
    cfg.validate()?;
    Ok(Client::from_config(&cfg)?)
}

fn resolve_window(from: &str, to: &str) -> anyhow::Result<(DateTime<Utc>, DateTime<Utc>)> {
    let now = Utc::now();
    let from = parse_time_or_relative(from, now)?;
    let to = parse_time_or_relative(to, now)?;
    Ok((from, to))
}
