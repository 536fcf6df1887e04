use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};

use crate::core::config::{Defaults, DEFAULT_END_TIME_OFFSET, DEFAULT_INTERVAL, DEFAULT_PERIOD};

/// A metric name and the statistic requested for it, from a `name:statistic` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSpec {
    pub name: String,
    /// Empty when the token carried no statistic.
    pub statistic: String,
}

/// A dimension filter, from a `name:value` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionSpec {
    pub name: String,
    pub value: String,
}

/// First and last `:`-separated segments of a token. Without a colon both
/// are the whole token.
fn first_and_last(token: &str) -> (&str, &str) {
    let first = token.split(':').next().unwrap_or(token);
    let last = token.rsplit(':').next().unwrap_or(token);
    (first, last)
}

fn tokens(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').filter(|t| !t.is_empty())
}

/// Parse a comma-separated `name:statistic` list. Permissive: a token with no
/// statistic keeps an empty one instead of being rejected.
pub fn parse_metrics(list: &str) -> Vec<MetricSpec> {
    tokens(list)
        .map(|token| {
            let (name, last) = first_and_last(token);
            let statistic = if token.contains(':') { last } else { "" };
            MetricSpec {
                name: name.to_string(),
                statistic: statistic.to_string(),
            }
        })
        .collect()
}

/// Parse a comma-separated `name:value` list, preserving input order. A
/// token without a colon uses its name as the value.
pub fn parse_dimensions(list: &str) -> Vec<DimensionSpec> {
    tokens(list)
        .map(|token| {
            let (name, value) = first_and_last(token);
            DimensionSpec {
                name: name.to_string(),
                value: value.to_string(),
            }
        })
        .collect()
}

/// The query window shared by every request of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// end = now - offset, start = end - interval (both in seconds).
    pub fn ending_at(now: DateTime<Utc>, interval: i64, end_time_offset: i64) -> Result<Self> {
        let end = Duration::try_seconds(end_time_offset)
            .and_then(|offset| now.checked_sub_signed(offset))
            .with_context(|| format!("end time offset out of range: {}s", end_time_offset))?;
        let start = Duration::try_seconds(interval)
            .and_then(|interval| end.checked_sub_signed(interval))
            .with_context(|| format!("interval out of range: {}s", interval))?;
        Ok(Self { start, end })
    }
}

/// Query options as supplied on the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub namespace: String,
    pub metrics: String,
    pub dimensions: Option<String>,
    pub interval: Option<i64>,
    pub end_time_offset: Option<i64>,
    pub period: Option<i32>,
    pub scheme: Option<String>,
    pub newest_only: bool,
    pub flatten_dimensions: bool,
}

/// Normalized, immutable description of what one run fetches.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryConfig {
    pub namespace: String,
    pub metrics: Vec<MetricSpec>,
    pub dimensions: Vec<DimensionSpec>,
    pub window: TimeWindow,
    pub period: i32,
    pub scheme: String,
    pub newest_only: bool,
    pub flatten_dimensions: bool,
}

impl QueryConfig {
    /// Merge flags over config-file defaults and fix the time window at `now`.
    pub fn resolve(opts: &QueryOptions, defaults: &Defaults, now: DateTime<Utc>) -> Result<Self> {
        let interval = opts
            .interval
            .or(defaults.interval)
            .unwrap_or(DEFAULT_INTERVAL);
        let end_time_offset = opts
            .end_time_offset
            .or(defaults.end_time_offset)
            .unwrap_or(DEFAULT_END_TIME_OFFSET);
        let period = opts.period.or(defaults.period).unwrap_or(DEFAULT_PERIOD);
        let scheme = opts
            .scheme
            .clone()
            .or_else(|| defaults.scheme.clone())
            .unwrap_or_default();

        Ok(Self {
            namespace: opts.namespace.clone(),
            metrics: parse_metrics(&opts.metrics),
            dimensions: opts
                .dimensions
                .as_deref()
                .map(parse_dimensions)
                .unwrap_or_default(),
            window: TimeWindow::ending_at(now, interval, end_time_offset)?,
            period,
            scheme,
            newest_only: opts.newest_only,
            flatten_dimensions: opts.flatten_dimensions,
        })
    }
}
