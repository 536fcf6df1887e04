use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;

use crate::cli::output;
use crate::core::auth::AwsSettings;
use crate::core::cloudwatch::{CloudWatchSource, FetchError};
use crate::core::config::AppConfig;
use crate::core::fetch::fetch_and_emit;
use crate::core::models::status::Health;
use crate::core::query::{QueryConfig, QueryOptions};

/// Everything the command line supplies for one run.
#[derive(Debug, Clone, Default)]
pub struct MetricsArgs {
    pub config: Option<PathBuf>,
    pub profile: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub region: Option<String>,
    pub query: QueryOptions,
}

async fn fetch(args: &MetricsArgs) -> Result<usize> {
    let app_config = AppConfig::load(args.config.as_deref())?;
    for issue in app_config.validate() {
        tracing::warn!("config: {}", issue);
    }
    let defaults = &app_config.defaults;

    let query = QueryConfig::resolve(&args.query, defaults, Utc::now())?;

    let settings = AwsSettings::from_options(
        args.profile.as_ref(),
        args.access_key_id.as_ref(),
        args.secret_access_key.as_ref(),
        args.region.as_ref(),
        defaults,
    )
    .with_discovered_region()
    .await;
    let source = CloudWatchSource::new(&settings.load().await);

    let mut stdout = std::io::stdout();
    fetch_and_emit(&source, &query, &mut stdout)
        .await
        .context("Failed to fetch CloudWatch statistics")
}

/// Map a run result to the health reported to the collector, with the
/// diagnostic to print for degraded runs.
pub fn outcome(result: &Result<usize>) -> (Health, Option<String>) {
    match result {
        Ok(_) => (Health::Ok, None),
        Err(err) => {
            let message = match err.downcast_ref::<FetchError>() {
                Some(fetch_err) if matches!(fetch_err, FetchError::Unsuccessful(_)) => {
                    fetch_err.to_string()
                }
                _ => format!("Error: {:#}", err),
            };
            (Health::Unknown, Some(message))
        }
    }
}

pub async fn run(args: MetricsArgs) -> Health {
    let result = fetch(&args).await;
    if let Err(err) = &result {
        tracing::debug!("run failed: {:?}", err);
    }
    let (health, message) = outcome(&result);
    if let Some(message) = message {
        eprintln!("{}", output::status_message(health, &message));
    }
    health
}
