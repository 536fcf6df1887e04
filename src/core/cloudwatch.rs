use async_trait::async_trait;
use aws_sdk_cloudwatch::error::{DisplayErrorContext, SdkError};
use aws_sdk_cloudwatch::operation::get_metric_statistics::builders::GetMetricStatisticsFluentBuilder;
use aws_sdk_cloudwatch::primitives::DateTime as AwsDateTime;
use aws_sdk_cloudwatch::types::{Datapoint as AwsDatapoint, Dimension, Statistic};
use aws_sdk_cloudwatch::Client;
use chrono::{DateTime, TimeZone, Utc};
use thiserror::Error;

use crate::core::models::datapoint::Datapoint;
use crate::core::planner::PlannedQuery;
use crate::core::query::{DimensionSpec, QueryConfig, TimeWindow};

const STANDARD_STATISTICS: [&str; 5] = ["SampleCount", "Average", "Sum", "Minimum", "Maximum"];

#[derive(Error, Debug)]
pub enum FetchError {
    /// The service answered with an error response.
    #[error("CloudWatch GetMetricStatistics unsuccessful. {0}")]
    Unsuccessful(String),
    /// The request never produced a service response (network, timeout, ...).
    #[error("CloudWatch request failed: {0}")]
    Transport(String),
}

impl<E, R> From<SdkError<E, R>> for FetchError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    fn from(err: SdkError<E, R>) -> Self {
        let detail = DisplayErrorContext(&err).to_string();
        match err {
            SdkError::ServiceError(_) => Self::Unsuccessful(detail),
            _ => Self::Transport(detail),
        }
    }
}

/// Parameters of one GetMetricStatistics call.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsRequest {
    pub namespace: String,
    pub metric_name: String,
    pub window: TimeWindow,
    pub period: i32,
    /// Empty when the metric token carried no statistic.
    pub statistic: String,
    pub dimensions: Vec<DimensionSpec>,
}

impl StatisticsRequest {
    pub fn new(config: &QueryConfig, query: &PlannedQuery) -> Self {
        Self {
            namespace: config.namespace.clone(),
            metric_name: query.metric.name.clone(),
            window: config.window,
            period: config.period,
            statistic: query.metric.statistic.clone(),
            dimensions: query.dimensions.clone(),
        }
    }

    /// SampleCount/Average/Sum/Minimum/Maximum, matched case-insensitively.
    pub fn standard_statistic(&self) -> Option<&'static str> {
        STANDARD_STATISTICS
            .iter()
            .copied()
            .find(|s| s.eq_ignore_ascii_case(&self.statistic))
    }
}

/// The monitoring service: given a request, returns its datapoints or fails.
#[async_trait]
pub trait MetricSource {
    async fn get_metric_statistics(
        &self,
        request: &StatisticsRequest,
    ) -> Result<Vec<Datapoint>, FetchError>;
}

/// [`MetricSource`] backed by the AWS CloudWatch API.
pub struct CloudWatchSource {
    client: Client,
}

impl CloudWatchSource {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

fn aws_time(time: DateTime<Utc>) -> AwsDateTime {
    AwsDateTime::from_millis(time.timestamp_millis())
}

/// Convert an SDK datapoint, keying every present value by its lower-cased
/// statistic name. Datapoints without a timestamp are dropped.
fn convert_datapoint(dp: &AwsDatapoint) -> Option<Datapoint> {
    let ts = dp.timestamp()?;
    let timestamp = Utc
        .timestamp_opt(ts.secs(), ts.subsec_nanos())
        .single()?;
    let mut datapoint = Datapoint::new(timestamp);
    let standard = [
        ("samplecount", dp.sample_count()),
        ("average", dp.average()),
        ("sum", dp.sum()),
        ("minimum", dp.minimum()),
        ("maximum", dp.maximum()),
    ];
    for (name, value) in standard {
        if let Some(value) = value {
            datapoint = datapoint.with_value(name, value);
        }
    }
    if let Some(extended) = dp.extended_statistics() {
        for (name, value) in extended {
            datapoint = datapoint.with_value(name, *value);
        }
    }
    Some(datapoint)
}

/// Build the GetMetricStatistics call, setting only the parameters that are present.
fn build_call(client: &Client, request: &StatisticsRequest) -> GetMetricStatisticsFluentBuilder {
    let mut call = client
        .get_metric_statistics()
        .namespace(&request.namespace)
        .metric_name(&request.metric_name)
        .start_time(aws_time(request.window.start))
        .end_time(aws_time(request.window.end))
        .period(request.period);

    if let Some(statistic) = request.standard_statistic() {
        call = call.statistics(Statistic::from(statistic));
    } else if !request.statistic.is_empty() {
        call = call.extended_statistics(&request.statistic);
    }

    for dimension in &request.dimensions {
        call = call.dimensions(
            Dimension::builder()
                .name(&dimension.name)
                .value(&dimension.value)
                .build(),
        );
    }
    call
}

#[async_trait]
impl MetricSource for CloudWatchSource {
    async fn get_metric_statistics(
        &self,
        request: &StatisticsRequest,
    ) -> Result<Vec<Datapoint>, FetchError> {
        let output = build_call(&self.client, request).send().await?;

        let datapoints: Vec<Datapoint> = output
            .datapoints()
            .iter()
            .filter_map(|dp| {
                let converted = convert_datapoint(dp);
                if converted.is_none() {
                    tracing::warn!(metric = %request.metric_name, "dropping datapoint without timestamp");
                }
                converted
            })
            .collect();

        tracing::debug!(
            metric = %request.metric_name,
            statistic = %request.statistic,
            count = datapoints.len(),
            "datapoints received"
        );
        Ok(datapoints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::query::{parse_dimensions, parse_metrics};
    use aws_sdk_cloudwatch::config::{BehaviorVersion, Region};
    use std::collections::HashMap;

    fn offline_client() -> Client {
        let config = aws_sdk_cloudwatch::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .build();
        Client::from_conf(config)
    }

    fn request(statistic: &str) -> StatisticsRequest {
        StatisticsRequest {
            namespace: "AWS/EC2".into(),
            metric_name: "CPUUtilization".into(),
            window: TimeWindow::ending_at(Utc.timestamp_opt(1_000, 0).unwrap(), 300, 0).unwrap(),
            period: 60,
            statistic: statistic.into(),
            dimensions: Vec::new(),
        }
    }

    #[test]
    fn standard_statistics_match_case_insensitively() {
        assert_eq!(request("average").standard_statistic(), Some("Average"));
        assert_eq!(request("SampleCount").standard_statistic(), Some("SampleCount"));
        assert_eq!(request("p99").standard_statistic(), None);
        assert_eq!(request("").standard_statistic(), None);
    }

    #[test]
    fn request_copies_shared_window_and_query_fields() {
        let config = QueryConfig {
            namespace: "AWS/ELB".into(),
            metrics: parse_metrics("Latency:Maximum"),
            dimensions: parse_dimensions("LoadBalancerName:front"),
            window: TimeWindow::ending_at(Utc.timestamp_opt(9_000, 0).unwrap(), 600, 0).unwrap(),
            period: 300,
            scheme: String::new(),
            newest_only: false,
            flatten_dimensions: false,
        };
        let query = crate::core::planner::plan(&config).remove(0);
        let req = StatisticsRequest::new(&config, &query);
        assert_eq!(req.namespace, "AWS/ELB");
        assert_eq!(req.metric_name, "Latency");
        assert_eq!(req.statistic, "Maximum");
        assert_eq!(req.period, 300);
        assert_eq!(req.window, config.window);
        assert_eq!(req.dimensions, config.dimensions);
    }

    #[test]
    fn convert_keys_values_by_lowercased_statistic() {
        let mut extended = HashMap::new();
        extended.insert("p99".to_string(), 42.0);
        let dp = AwsDatapoint::builder()
            .timestamp(AwsDateTime::from_secs(1_700_000_000))
            .average(1.5)
            .sample_count(3.0)
            .set_extended_statistics(Some(extended))
            .build();
        let converted = convert_datapoint(&dp).unwrap();
        assert_eq!(converted.timestamp.timestamp(), 1_700_000_000);
        assert_eq!(converted.value("Average"), Some(1.5));
        assert_eq!(converted.value("samplecount"), Some(3.0));
        assert_eq!(converted.value("p99"), Some(42.0));
        assert_eq!(converted.value("Sum"), None);
    }

    #[test]
    fn convert_drops_datapoint_without_timestamp() {
        let dp = AwsDatapoint::builder().sum(2.0).build();
        assert!(convert_datapoint(&dp).is_none());
    }

    #[test]
    fn aws_time_keeps_millisecond_precision() {
        let t = Utc.timestamp_opt(1_700_000_000, 250_000_000).unwrap();
        let converted = aws_time(t);
        assert_eq!(converted.secs(), 1_700_000_000);
        assert_eq!(converted.subsec_nanos(), 250_000_000);
    }

    #[tokio::test]
    async fn standard_statistic_goes_to_statistics() {
        let client = offline_client();
        let req = request("average");
        let call = build_call(&client, &req);
        let input = call.as_input();
        assert_eq!(input.get_namespace().as_deref(), Some("AWS/EC2"));
        assert_eq!(input.get_metric_name().as_deref(), Some("CPUUtilization"));
        assert_eq!(input.get_period(), &Some(60));
        assert_eq!(input.get_statistics(), &Some(vec![Statistic::Average]));
        assert!(input.get_extended_statistics().is_none());
        assert!(input.get_dimensions().is_none());
    }

    #[tokio::test]
    async fn percentile_goes_to_extended_statistics() {
        let client = offline_client();
        let req = request("p99");
        let call = build_call(&client, &req);
        let input = call.as_input();
        assert!(input.get_statistics().is_none());
        assert_eq!(input.get_extended_statistics(), &Some(vec!["p99".to_string()]));
    }

    #[tokio::test]
    async fn empty_statistic_sets_neither_list() {
        let client = offline_client();
        let req = request("");
        let call = build_call(&client, &req);
        let input = call.as_input();
        assert!(input.get_statistics().is_none());
        assert!(input.get_extended_statistics().is_none());
    }

    #[tokio::test]
    async fn dimensions_are_passed_in_order() {
        let client = offline_client();
        let mut req = request("Sum");
        req.dimensions = parse_dimensions("Host:web1,Env:prod");
        let call = build_call(&client, &req);
        let dims = call.as_input().get_dimensions().clone().unwrap();
        let pairs: Vec<(Option<&str>, Option<&str>)> =
            dims.iter().map(|d| (d.name(), d.value())).collect();
        assert_eq!(
            pairs,
            vec![(Some("Host"), Some("web1")), (Some("Env"), Some("prod"))]
        );
    }

    #[test]
    fn service_error_maps_to_unsuccessful() {
        let err: SdkError<std::io::Error, ()> =
            SdkError::service_error(std::io::Error::other("AccessDenied"), ());
        let fetch_err = FetchError::from(err);
        assert!(matches!(fetch_err, FetchError::Unsuccessful(_)));
        assert!(fetch_err
            .to_string()
            .starts_with("CloudWatch GetMetricStatistics unsuccessful. "));
    }

    #[test]
    fn timeout_maps_to_transport() {
        let err: SdkError<std::io::Error, ()> = SdkError::timeout_error("deadline exceeded");
        assert!(matches!(FetchError::from(err), FetchError::Transport(_)));
    }

    #[test]
    fn construction_failure_maps_to_transport() {
        let err: SdkError<std::io::Error, ()> =
            SdkError::construction_failure("invalid endpoint");
        assert!(matches!(FetchError::from(err), FetchError::Transport(_)));
    }
}
