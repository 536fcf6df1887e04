use aws_config::{BehaviorVersion, SdkConfig};
use aws_credential_types::Credentials;
use aws_sdk_cloudwatch::config::Region;

use crate::core::config::Defaults;
use crate::core::metadata;

/// Credential and region settings that were explicitly supplied.
///
/// Anything left `None` is resolved by the SDK's default provider chains.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AwsSettings {
    pub profile: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub region: Option<String>,
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}

impl AwsSettings {
    /// Keep only the entries that were actually given, flags first, then file defaults.
    pub fn from_options(
        profile: Option<&String>,
        access_key_id: Option<&String>,
        secret_access_key: Option<&String>,
        region: Option<&String>,
        defaults: &Defaults,
    ) -> Self {
        Self {
            profile: non_empty(profile).or_else(|| non_empty(defaults.profile.as_ref())),
            access_key_id: non_empty(access_key_id),
            secret_access_key: non_empty(secret_access_key),
            region: non_empty(region).or_else(|| non_empty(defaults.region.as_ref())),
        }
    }

    /// Static credentials, only when both halves of the key pair are present.
    pub fn static_credentials(&self) -> Option<Credentials> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(key), Some(secret)) => Some(Credentials::new(
                key.clone(),
                secret.clone(),
                None,
                None,
                "metrics-cloudwatch",
            )),
            (None, None) => None,
            _ => {
                tracing::warn!(
                    "both --access-key-id and --secret-access-key are needed; using the default credential chain"
                );
                None
            }
        }
    }

    /// Fill in the region from instance metadata when none was supplied.
    pub async fn with_discovered_region(mut self) -> Self {
        if self.region.is_none() {
            self.region = metadata::discover_region().await;
            match &self.region {
                Some(region) => tracing::debug!(%region, "region from instance metadata"),
                None => tracing::debug!("no region override; deferring to the SDK"),
            }
        }
        self
    }

    /// Build the SDK configuration, overriding only what was supplied.
    pub async fn load(&self) -> SdkConfig {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(profile) = &self.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(credentials) = self.static_credentials() {
            loader = loader.credentials_provider(credentials);
        }
        if let Some(region) = &self.region {
            loader = loader.region(Region::new(region.clone()));
        }
        loader.load().await
    }
}
