use crate::core::models::status::Health;

pub const PLUGIN_NAME: &str = "MetricsCloudWatch";

#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub verbose: bool,
}

/// Log to stderr; stdout carries only metric lines.
pub fn init_logging(opts: &OutputOptions) {
    let default_filter = if opts.verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_env_filter(filter)
        .init();
}

pub fn status_message(health: Health, message: &str) -> String {
    format!("{} {}: {}", PLUGIN_NAME, health, message)
}
