use crate::core::models::datapoint::Datapoint;

/// A single Graphite plaintext line: `<path> <value> <epoch-seconds>`.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputLine {
    pub path: String,
    pub value: f64,
    pub timestamp: i64,
}

impl std::fmt::Display for OutputLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.path, self.value, self.timestamp)
    }
}

/// Dot-join scheme, dimension label, metric and statistic, dropping empty segments.
pub fn format_path(scheme: &str, label: &[String], metric: &str, statistic: &str) -> String {
    std::iter::once(scheme)
        .chain(label.iter().map(String::as_str))
        .chain([metric, statistic])
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

/// Keep every datapoint, or only the one with the latest timestamp.
pub fn select_datapoints(mut datapoints: Vec<Datapoint>, newest_only: bool) -> Vec<Datapoint> {
    if !newest_only {
        return datapoints;
    }
    datapoints.sort_by_key(|dp| dp.timestamp);
    datapoints.pop().into_iter().collect()
}

/// Build the output line for one datapoint. `None` when the datapoint has no
/// value for the requested statistic.
pub fn format_datapoint(path: &str, statistic: &str, datapoint: &Datapoint) -> Option<OutputLine> {
    let value = datapoint.value(statistic)?;
    Some(OutputLine {
        path: path.to_string(),
        value,
        timestamp: datapoint.timestamp.timestamp(),
    })
}
