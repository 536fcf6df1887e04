use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// A single sample returned by the monitoring service.
#[derive(Debug, Clone, PartialEq)]
pub struct Datapoint {
    pub timestamp: DateTime<Utc>,
    /// Values keyed by lower-cased statistic name ("average", "samplecount", "p99").
    pub values: HashMap<String, f64>,
}

impl Datapoint {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            values: HashMap::new(),
        }
    }

    pub fn with_value(mut self, statistic: &str, value: f64) -> Self {
        self.values.insert(statistic.to_lowercase(), value);
        self
    }

    /// Look up the value for a statistic, case-insensitively.
    pub fn value(&self, statistic: &str) -> Option<f64> {
        self.values.get(&statistic.to_lowercase()).copied()
    }
}
