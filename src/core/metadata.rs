use std::time::Duration;

use anyhow::{Context, Result};

const AVAILABILITY_ZONE_URL: &str =
    "http://169.254.169.254/latest/meta-data/placement/availability-zone";
const METADATA_TIMEOUT: Duration = Duration::from_secs(3);

/// Derive a region from an availability zone by dropping the zone letter
/// ("us-east-1a" -> "us-east-1").
pub fn region_from_zone(zone: &str) -> Option<String> {
    let zone = zone.trim();
    let mut chars = zone.chars();
    chars.next_back()?;
    let region = chars.as_str();
    if region.is_empty() {
        return None;
    }
    Some(region.to_string())
}

async fn fetch_zone(url: &str, timeout: Duration) -> Result<String> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let response = client
        .get(url)
        .send()
        .await
        .context("Failed to reach instance metadata")?;

    if !response.status().is_success() {
        anyhow::bail!("Instance metadata returned HTTP {}", response.status().as_u16());
    }

    response
        .text()
        .await
        .context("Failed to read instance metadata response")
}

/// Ask an instance-metadata endpoint for the availability zone. Every failure
/// is swallowed and reported as `None`.
pub async fn region_from(url: &str, timeout: Duration) -> Option<String> {
    match fetch_zone(url, timeout).await {
        Ok(zone) => region_from_zone(&zone),
        Err(err) => {
            tracing::debug!(error = %format!("{:#}", err), "region discovery failed");
            None
        }
    }
}

/// Discover the region of the EC2 instance we are running on, if any.
pub async fn discover_region() -> Option<String> {
    region_from(AVAILABILITY_ZONE_URL, METADATA_TIMEOUT).await
}
