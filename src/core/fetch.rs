use std::io::Write;

use anyhow::{Context, Result};

use crate::core::cloudwatch::{MetricSource, StatisticsRequest};
use crate::core::formatter::{format_datapoint, format_path, select_datapoints};
use crate::core::planner;
use crate::core::query::QueryConfig;

/// Run every planned query in order, writing one line per datapoint to `out`.
///
/// Output is flushed after each query. The first error aborts the remaining
/// queries. Returns the number of lines written.
pub async fn fetch_and_emit<S, W>(source: &S, config: &QueryConfig, out: &mut W) -> Result<usize>
where
    S: MetricSource + Sync,
    W: Write,
{
    let queries = planner::plan(config);
    tracing::debug!(
        count = queries.len(),
        start = %config.window.start,
        end = %config.window.end,
        "planned queries"
    );

    let mut written = 0;
    for query in &queries {
        let request = StatisticsRequest::new(config, query);
        tracing::debug!(
            metric = %request.metric_name,
            statistic = %request.statistic,
            dimensions = request.dimensions.len(),
            "fetching"
        );

        let datapoints = source.get_metric_statistics(&request).await?;
        let path = format_path(
            &config.scheme,
            &query.label,
            &query.metric.name,
            &query.metric.statistic,
        );

        for datapoint in select_datapoints(datapoints, config.newest_only) {
            match format_datapoint(&path, &query.metric.statistic, &datapoint) {
                Some(line) => {
                    writeln!(out, "{}", line).context("Failed to write metric line")?;
                    written += 1;
                }
                None => tracing::warn!(
                    %path,
                    timestamp = datapoint.timestamp.timestamp(),
                    "datapoint has no value for the requested statistic"
                ),
            }
        }
        out.flush().context("Failed to flush output")?;
    }
    Ok(written)
}
