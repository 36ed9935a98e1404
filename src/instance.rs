//! instance
//!
//! Instance resolution: which URLs to address for a given instance type.
//!
//! An instance is a Dify backend deployment, either the shared cloud service
//! or a self-hosted server. Cloud and custom configurations are mutually
//! exclusive per session: cloud always resolves to the fixed public endpoint
//! regardless of any stored custom domain, while custom requires an explicit
//! user-supplied domain.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hostname of the shared cloud instance.
pub const CLOUD_HOST: &str = "cloud.dify.ai";

/// Base URL of the shared cloud instance.
pub const CLOUD_URL: &str = "https://cloud.dify.ai";

/// Console API prefix for the shared cloud instance.
pub const CLOUD_API_PREFIX: &str = "https://cloud.dify.ai/console/api";

/// Path of the hosted sign-in page, relative to the instance URL.
pub const SIGN_IN_PATH: &str = "/signin";

/// Path the hosted login redirects to after a successful sign-in.
pub const LANDING_PATH: &str = "/apps";

/// Which kind of backend this session talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceType {
    /// The shared cloud service at `cloud.dify.ai`.
    #[default]
    Cloud,
    /// A self-hosted server with a user-supplied domain.
    Custom,
}

impl InstanceType {
    /// The string stored under the `instance_type` key.
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceType::Cloud => "cloud",
            InstanceType::Custom => "custom",
        }
    }
}

impl fmt::Display for InstanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstanceType {
    type Err = InstanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cloud" => Ok(InstanceType::Cloud),
            "custom" => Ok(InstanceType::Custom),
            other => Err(InstanceError::UnknownType(other.to_string())),
        }
    }
}

/// Errors from instance resolution.
#[derive(Debug, thiserror::Error)]
pub enum InstanceError {
    /// Stored instance type string is not "cloud" or "custom".
    #[error("unknown instance type: '{0}' (valid: cloud, custom)")]
    UnknownType(String),

    /// Custom instance selected but no domain supplied.
    #[error("custom instance requires a domain")]
    MissingDomain,
}

/// A resolved instance: the URLs downstream HTTP calls address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInstance {
    /// Base URL of the instance (also persisted as `base_url`).
    pub instance_url: String,
    /// Console API prefix for REST calls.
    pub api_prefix: String,
}

/// Normalize a user-supplied domain into a URL.
///
/// Prepends `https://` when no scheme is given and strips a trailing slash.
pub fn normalize_domain(domain: &str) -> String {
    let trimmed = domain.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Resolve the URLs for an instance type.
///
/// Cloud ignores `domain` entirely; custom requires one.
pub fn resolve(
    instance_type: InstanceType,
    domain: Option<&str>,
) -> Result<ResolvedInstance, InstanceError> {
    match instance_type {
        InstanceType::Cloud => Ok(ResolvedInstance {
            instance_url: CLOUD_URL.to_string(),
            api_prefix: CLOUD_API_PREFIX.to_string(),
        }),
        InstanceType::Custom => {
            let domain = domain.ok_or(InstanceError::MissingDomain)?;
            if domain.trim().is_empty() {
                return Err(InstanceError::MissingDomain);
            }
            let instance_url = normalize_domain(domain);
            let api_prefix = format!("{}/console/api", instance_url);
            Ok(ResolvedInstance {
                instance_url,
                api_prefix,
            })
        }
    }
}

/// The hosted sign-in URL for an instance.
pub fn sign_in_url(instance_url: &str) -> String {
    format!("{}{}", instance_url.trim_end_matches('/'), SIGN_IN_PATH)
}
