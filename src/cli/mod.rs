pub mod metrics_cmd;
pub mod output;
