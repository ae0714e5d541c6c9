//! Endpoint configuration for report and changelog retrieval.
//!
//! Defaults point at the public Ubuntu and Debian services. Each endpoint can
//! be overridden from the environment:
//!
//! - `MERGES_REPORT_BASE_URL`
//! - `MERGES_UBUNTU_CHANGELOG_BASE_URL`
//! - `MERGES_DEBIAN_CHANGELOG_BASE_URL`
//! - `MERGES_PROXIES` (comma-separated proxy prefixes, tried after direct access)
//! - `MERGES_TIMEOUT_SECS`

use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::types::Classification;

const DEFAULT_REPORT_BASE_URL: &str = "https://merges.ubuntu.com/";
const DEFAULT_UBUNTU_CHANGELOG_BASE_URL: &str = "https://changelogs.ubuntu.com/changelogs/pool/";
const DEFAULT_DEBIAN_CHANGELOG_BASE_URL: &str = "https://metadata.ftp-master.debian.org/changelogs/";
const DEFAULT_LAUNCHPAD_BASE_URL: &str = "https://launchpad.net/ubuntu/+source/";
const DEFAULT_DEBIAN_TRACKER_BASE_URL: &str = "https://tracker.debian.org/pkg/";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_REPORT_BASE_URL: &str = "MERGES_REPORT_BASE_URL";
pub const ENV_UBUNTU_CHANGELOG_BASE_URL: &str = "MERGES_UBUNTU_CHANGELOG_BASE_URL";
pub const ENV_DEBIAN_CHANGELOG_BASE_URL: &str = "MERGES_DEBIAN_CHANGELOG_BASE_URL";
pub const ENV_PROXIES: &str = "MERGES_PROXIES";
pub const ENV_TIMEOUT_SECS: &str = "MERGES_TIMEOUT_SECS";

/// Errors raised while building a [`MergesConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A base URL could not be parsed.
    #[error("invalid URL for {setting}: {value}")]
    InvalidUrl {
        setting: String,
        value: String,
        #[source]
        source: url::ParseError,
    },

    /// The timeout was not a whole number of seconds.
    #[error("invalid timeout '{0}', expected whole seconds")]
    InvalidTimeout(String),
}

/// Where reports and changelogs are fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergesConfig {
    pub report_base_url: Url,
    pub ubuntu_changelog_base_url: Url,
    pub debian_changelog_base_url: Url,
    pub launchpad_base_url: Url,
    pub debian_tracker_base_url: Url,
    /// Proxy prefixes tried in order after direct access fails.
    pub proxies: Vec<String>,
    pub timeout: Duration,
}

impl Default for MergesConfig {
    fn default() -> Self {
        Self {
            report_base_url: builtin(DEFAULT_REPORT_BASE_URL),
            ubuntu_changelog_base_url: builtin(DEFAULT_UBUNTU_CHANGELOG_BASE_URL),
            debian_changelog_base_url: builtin(DEFAULT_DEBIAN_CHANGELOG_BASE_URL),
            launchpad_base_url: builtin(DEFAULT_LAUNCHPAD_BASE_URL),
            debian_tracker_base_url: builtin(DEFAULT_DEBIAN_TRACKER_BASE_URL),
            proxies: Vec::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl MergesConfig {
    /// Builds a configuration from process environment variables.
    ///
    /// ## Errors
    ///
    /// Returns an error if a URL or the timeout is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    ///
    /// Unset and blank values keep their defaults.
    ///
    /// ## Examples
    ///
    /// ```
    /// use merges_lib::MergesConfig;
    ///
    /// let config = MergesConfig::from_lookup(|key| match key {
    ///     "MERGES_PROXIES" => Some("https://a.example/?u=, https://b.example/?u=".to_string()),
    ///     _ => None,
    /// })
    /// .unwrap();
    /// assert_eq!(config.proxies.len(), 2);
    /// ```
    ///
    /// ## Errors
    ///
    /// Returns an error if a URL or the timeout is malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_REPORT_BASE_URL) {
            config.report_base_url = parse_base_url(ENV_REPORT_BASE_URL, &value)?;
        }
        if let Some(value) = lookup(ENV_UBUNTU_CHANGELOG_BASE_URL) {
            config.ubuntu_changelog_base_url =
                parse_base_url(ENV_UBUNTU_CHANGELOG_BASE_URL, &value)?;
        }
        if let Some(value) = lookup(ENV_DEBIAN_CHANGELOG_BASE_URL) {
            config.debian_changelog_base_url =
                parse_base_url(ENV_DEBIAN_CHANGELOG_BASE_URL, &value)?;
        }
        if let Some(value) = lookup(ENV_PROXIES) {
            config.proxies = value
                .split(',')
                .map(str::trim)
                .filter(|proxy| !proxy.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(value) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout(value.clone()))?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Replaces the report base URL.
    ///
    /// ## Errors
    ///
    /// Returns an error if `value` is not a valid URL.
    pub fn with_report_base_url(mut self, value: &str) -> Result<Self, ConfigError> {
        self.report_base_url = parse_base_url("report base URL", value)?;
        Ok(self)
    }

    /// Replaces both changelog base URLs.
    ///
    /// ## Errors
    ///
    /// Returns an error if either value is not a valid URL.
    pub fn with_changelog_base_urls(mut self, ubuntu: &str, debian: &str) -> Result<Self, ConfigError> {
        self.ubuntu_changelog_base_url = parse_base_url("Ubuntu changelog base URL", ubuntu)?;
        self.debian_changelog_base_url = parse_base_url("Debian changelog base URL", debian)?;
        Ok(self)
    }

    /// Appends proxy prefixes to the access path list.
    pub fn with_proxies(mut self, proxies: impl IntoIterator<Item = String>) -> Self {
        self.proxies.extend(proxies);
        self
    }

    /// URL of the report for `classification`, e.g. `{base}/main.json`.
    pub fn report_url(&self, classification: Classification) -> String {
        format!("{}{}.json", self.report_base_url, classification.report_slug())
    }
}

/// Parses a base URL and makes sure it ends in `/` so that paths append.
fn parse_base_url(setting: &str, value: &str) -> Result<Url, ConfigError> {
    let trimmed = value.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };

    Url::parse(&with_slash).map_err(|source| ConfigError::InvalidUrl {
        setting: setting.to_string(),
        value: value.to_string(),
        source,
    })
}

fn builtin(value: &str) -> Url {
    Url::parse(value).expect("valid built-in URL")
}
