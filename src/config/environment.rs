// ABOUTME: Environment configuration for the feed poller
// ABOUTME: Parses tenant credentials, content types, timing and endpoint settings from environment variables
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Environment-based configuration

use crate::constants::{api, defaults, env_config, windows};
use anyhow::{Context, Result};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Complete poller configuration
#[derive(Clone)]
pub struct PollerConfig {
    /// Time between poll cycles
    pub poll_period: Duration,
    /// Tenant domain, e.g. `contoso.onmicrosoft.com`
    pub tenant_domain: String,
    /// Application (client) id
    pub client_id: String,
    /// Client secret
    pub client_secret: String,
    /// Directory (tenant) id, also sent as `PublisherIdentifier`
    pub directory_id: String,
    /// Content types to poll, in order
    pub content_types: Vec<String>,
    /// Where the watermark is persisted
    pub checkpoint_path: PathBuf,
    /// Per-request timeout
    pub api_timeout: Duration,
    /// How far back a listing may reach
    pub content_max_age: Duration,
    /// Authorization base URL
    pub login_url: String,
    /// Resource / API base URL
    pub resource_url: String,
}

impl PollerConfig {
    /// Configuration with defaults for everything except tenant identity and credentials
    #[must_use]
    pub fn new(
        tenant_domain: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        directory_id: impl Into<String>,
    ) -> Self {
        Self {
            poll_period: Duration::from_secs(defaults::POLL_PERIOD_SECS),
            tenant_domain: tenant_domain.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            directory_id: directory_id.into(),
            content_types: defaults::CONTENT_TYPES
                .iter()
                .map(|&t| t.to_owned())
                .collect(),
            checkpoint_path: PathBuf::from(defaults::CHECKPOINT_PATH),
            api_timeout: Duration::from_secs(defaults::API_TIMEOUT_SECS),
            content_max_age: Duration::from_secs(defaults::CONTENT_MAX_AGE_HOURS * 3600),
            login_url: defaults::LOGIN_URL.to_owned(),
            resource_url: defaults::RESOURCE_URL.to_owned(),
        }
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing, a numeric value does
    /// not parse, or the resulting configuration fails validation
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let mut config = Self::new(
            required(env_config::TENANT_DOMAIN)?,
            required(env_config::CLIENT_ID)?,
            required(env_config::CLIENT_SECRET)?,
            required(env_config::DIRECTORY_ID)?,
        );

        config.poll_period = Duration::from_secs(
            env_var_or(env_config::POLL_PERIOD_SECS, &defaults::POLL_PERIOD_SECS.to_string())
                .parse()
                .with_context(|| format!("{} must be a whole number of seconds", env_config::POLL_PERIOD_SECS))?,
        );
        config.api_timeout = Duration::from_secs(
            env_var_or(env_config::API_TIMEOUT_SECS, &defaults::API_TIMEOUT_SECS.to_string())
                .parse()
                .with_context(|| format!("{} must be a whole number of seconds", env_config::API_TIMEOUT_SECS))?,
        );
        let max_age_hours: u64 = env_var_or(
            env_config::CONTENT_MAX_AGE_HOURS,
            &defaults::CONTENT_MAX_AGE_HOURS.to_string(),
        )
        .parse()
        .with_context(|| format!("{} must be a whole number of hours", env_config::CONTENT_MAX_AGE_HOURS))?;
        config.content_max_age = Duration::from_secs(
            max_age_hours
                .checked_mul(3600)
                .with_context(|| format!("{} is out of range", env_config::CONTENT_MAX_AGE_HOURS))?,
        );

        if let Ok(raw) = env::var(env_config::CONTENT_TYPES) {
            config.content_types = parse_content_types(&raw);
        }
        if let Ok(path) = env::var(env_config::CHECKPOINT_PATH) {
            config.checkpoint_path = PathBuf::from(path);
        }
        config.login_url = env_var_or(env_config::LOGIN_URL, defaults::LOGIN_URL);
        config.resource_url = env_var_or(env_config::RESOURCE_URL, defaults::RESOURCE_URL);

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error describing the first inconsistent setting
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            (env_config::TENANT_DOMAIN, &self.tenant_domain),
            (env_config::CLIENT_ID, &self.client_id),
            (env_config::CLIENT_SECRET, &self.client_secret),
            (env_config::DIRECTORY_ID, &self.directory_id),
        ] {
            if value.trim().is_empty() {
                anyhow::bail!("{name} cannot be empty");
            }
        }

        if self.content_types.is_empty() {
            anyhow::bail!("At least one content type must be configured");
        }

        if self.poll_period.is_zero() {
            anyhow::bail!("Poll period must be greater than 0");
        }

        if self.api_timeout.is_zero() {
            anyhow::bail!("API timeout must be greater than 0");
        }

        if self.content_max_age.is_zero() {
            anyhow::bail!("Maximum content age must be greater than 0");
        }

        if self.content_max_age > Duration::from_secs(windows::MAX_LOOKBACK_HOURS * 3600) {
            anyhow::bail!(
                "Maximum content age cannot exceed {} hours",
                windows::MAX_LOOKBACK_HOURS
            );
        }

        url::Url::parse(&self.token_url()).context("Login URL does not form a valid token URL")?;
        url::Url::parse(&self.api_root_url()).context("Resource URL does not form a valid API root")?;

        Ok(())
    }

    /// Client-credentials token endpoint for the tenant
    #[must_use]
    pub fn token_url(&self) -> String {
        format!(
            "{}/{}/{}?api-version={}",
            self.login_url.trim_end_matches('/'),
            self.tenant_domain,
            api::TOKEN_PATH,
            api::TOKEN_API_VERSION
        )
    }

    /// Root of the tenant's activity feed (ends with `/`)
    #[must_use]
    pub fn api_root_url(&self) -> String {
        format!(
            "{}/{}/{}/activity/feed/",
            self.resource_url.trim_end_matches('/'),
            api::API_VERSION_PATH,
            self.directory_id
        )
    }

    /// Maximum lookback as a chrono duration
    #[must_use]
    pub fn max_lookback(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.content_max_age)
            .unwrap_or_else(|_| chrono::Duration::days(7))
    }

    /// Get a one-line summary suitable for startup logs
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Feed Poller Configuration: tenant={} directory={} client_id={} content_types=[{}] \
             period={}s timeout={}s max_age={}h checkpoint={} login={} resource={}",
            self.tenant_domain,
            self.directory_id,
            self.client_id,
            self.content_types.join(","),
            self.poll_period.as_secs(),
            self.api_timeout.as_secs(),
            self.content_max_age.as_secs() / 3600,
            self.checkpoint_path.display(),
            self.login_url,
            self.resource_url,
        )
    }
}

impl fmt::Debug for PollerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollerConfig")
            .field("poll_period", &self.poll_period)
            .field("tenant_domain", &self.tenant_domain)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("directory_id", &self.directory_id)
            .field("content_types", &self.content_types)
            .field("checkpoint_path", &self.checkpoint_path)
            .field("api_timeout", &self.api_timeout)
            .field("content_max_age", &self.content_max_age)
            .field("login_url", &self.login_url)
            .field("resource_url", &self.resource_url)
            .finish()
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} environment variable is required"))
}

/// Parse a comma-separated content type list, keeping order and dropping blanks
fn parse_content_types(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> PollerConfig {
        PollerConfig::new("contoso.onmicrosoft.com", "app-id", "s3cret", "dir-id")
    }

    #[test]
    fn test_defaults_validate() {
        let config = valid();
        assert!(config.validate().is_ok());
        assert_eq!(config.content_types.len(), 5);
        assert_eq!(config.content_max_age, Duration::from_secs(168 * 3600));
    }

    #[test]
    fn test_empty_credentials_rejected() {
        let mut config = valid();
        config.client_secret = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_period_rejected() {
        let mut config = valid();
        config.poll_period = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_lookback_above_api_limit_rejected() {
        let mut config = valid();
        config.content_max_age = Duration::from_secs(169 * 3600);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_content_types_rejected() {
        let mut config = valid();
        config.content_types.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_endpoint_urls() {
        let config = valid();
        assert_eq!(
            config.token_url(),
            "https://login.microsoftonline.com/contoso.onmicrosoft.com/oauth2/token?api-version=1.0"
        );
        assert_eq!(
            config.api_root_url(),
            "https://manage.office.com/api/v1.0/dir-id/activity/feed/"
        );
    }

    #[test]
    fn test_trailing_slash_in_base_urls() {
        let mut config = valid();
        config.resource_url = "http://127.0.0.1:9000/".to_owned();
        assert_eq!(
            config.api_root_url(),
            "http://127.0.0.1:9000/api/v1.0/dir-id/activity/feed/"
        );
    }

    #[test]
    fn test_parse_content_types_keeps_order() {
        assert_eq!(
            parse_content_types(" Audit.General, ,DLP.All,Audit.Exchange "),
            vec!["Audit.General", "DLP.All", "Audit.Exchange"]
        );
    }

    #[test]
    fn test_secret_redacted_everywhere() {
        let config = valid();
        assert!(!format!("{config:?}").contains("s3cret"));
        assert!(!config.summary().contains("s3cret"));
    }
}
