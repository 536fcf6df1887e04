//! Expands a [`QueryConfig`] into the individual API requests of a run.
//!
//! With dimension flattening every metric is fetched once per dimension, so
//! the number of remote calls grows to `metrics x dimensions`.

use crate::core::query::{DimensionSpec, MetricSpec, QueryConfig};

/// One remote request and the dimension segments used in its output path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedQuery {
    pub metric: MetricSpec,
    pub dimensions: Vec<DimensionSpec>,
    /// Flattened `[name, value, name, value, ...]` path segments.
    pub label: Vec<String>,
}

fn label_for(dimensions: &[DimensionSpec]) -> Vec<String> {
    dimensions
        .iter()
        .flat_map(|d| [d.name.clone(), d.value.clone()])
        .collect()
}

pub fn plan(config: &QueryConfig) -> Vec<PlannedQuery> {
    let mut queries = Vec::new();
    for metric in &config.metrics {
        if config.flatten_dimensions {
            for dimension in &config.dimensions {
                let dimensions = vec![dimension.clone()];
                queries.push(PlannedQuery {
                    metric: metric.clone(),
                    label: label_for(&dimensions),
                    dimensions,
                });
            }
        } else {
            queries.push(PlannedQuery {
                metric: metric.clone(),
                dimensions: config.dimensions.clone(),
                label: label_for(&config.dimensions),
            });
        }
    }
    queries
}
