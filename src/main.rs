mod cli;
mod core;

use std::path::PathBuf;

use clap::Parser;

use crate::cli::metrics_cmd::MetricsArgs;
use crate::cli::output::OutputOptions;
use crate::core::query::QueryOptions;

#[derive(Parser)]
#[command(
    name = "metrics-cloudwatch",
    about = "Fetch CloudWatch metric statistics as Graphite plaintext lines",
    version
)]
struct Cli {
    /// Profile name of AWS shared credential file entry
    #[arg(long)]
    profile: Option<String>,

    /// AWS access key id
    #[arg(short = 'k', long)]
    access_key_id: Option<String>,

    /// AWS secret access key
    #[arg(short = 's', long)]
    secret_access_key: Option<String>,

    /// AWS region (discovered from instance metadata when omitted)
    #[arg(short, long)]
    region: Option<String>,

    /// CloudWatch namespace
    #[arg(short, long)]
    namespace: String,

    /// Metric names and statistics: METRIC_NAME_1:TYPE,METRIC_NAME_2:TYPE...
    #[arg(short, long)]
    metrics: String,

    /// Dimension names and values: NAME_1:VALUE_1,NAME_2:VALUE_2...
    #[arg(short, long)]
    dimensions: Option<String>,

    /// Seconds between start and end of the statistics window [default: 300]
    #[arg(short, long, value_name = "N")]
    interval: Option<i64>,

    /// End the window this many seconds ago [default: 0]
    #[arg(long, value_name = "N")]
    end_time_offset: Option<i64>,

    /// Datapoint period in seconds [default: 60]
    #[arg(short, long, value_name = "N")]
    period: Option<i32>,

    /// Text to prepend to dimension and metric names
    #[arg(short = 'S', long)]
    scheme: Option<String>,

    /// Only output the newest datapoint of each query
    #[arg(short = 'N', long)]
    newest_only: bool,

    /// Output each dimension as its own line
    #[arg(short = 'F', long)]
    flatten_dimensions: bool,

    /// Config file with defaults (default: $XDG_CONFIG_HOME/metrics-cloudwatch/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl From<Cli> for MetricsArgs {
    fn from(cli: Cli) -> Self {
        Self {
            config: cli.config,
            profile: cli.profile,
            access_key_id: cli.access_key_id,
            secret_access_key: cli.secret_access_key,
            region: cli.region,
            query: QueryOptions {
                namespace: cli.namespace,
                metrics: cli.metrics,
                dimensions: cli.dimensions,
                interval: cli.interval,
                end_time_offset: cli.end_time_offset,
                period: cli.period,
                scheme: cli.scheme,
                newest_only: cli.newest_only,
                flatten_dimensions: cli.flatten_dimensions,
            },
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    cli::output::init_logging(&OutputOptions {
        verbose: cli.verbose,
    });

    let health = cli::metrics_cmd::run(cli.into()).await;
    std::process::exit(health.exit_code());
}
