//! Async fetching with access-path failover and tracing instrumentation.

use std::time::Duration;

use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tracing::{Span, instrument};

use super::access::AccessPath;
use super::error::RetrievalError;
use crate::changelog::{ChangelogEntry, ChangelogSide, changelog_candidates, external_link};
use crate::config::MergesConfig;
use crate::normalize::{TracingSink, combine_batches, normalize_with};
use crate::types::{Classification, MergeRecord};
use crate::validity::looks_like_valid_content;

/// Builder for configuring a [`Fetcher`].
#[derive(Debug)]
pub struct FetcherBuilder {
    config: MergesConfig,
    timeout: Duration,
    default_headers: HeaderMap,
}

impl FetcherBuilder {
    fn new(config: MergesConfig) -> Self {
        Self {
            timeout: config.timeout,
            config,
            default_headers: HeaderMap::new(),
        }
    }

    /// Overrides the request timeout from the configuration.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Adds a header sent with every request.
    ///
    /// ## Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(
        mut self,
        name: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> Result<Self, RetrievalError> {
        let name = HeaderName::try_from(name.as_ref()).map_err(|e| RetrievalError::InvalidHeader {
            message: format!("invalid header name: {e}"),
        })?;
        let value =
            HeaderValue::try_from(value.as_ref()).map_err(|e| RetrievalError::InvalidHeader {
                message: format!("invalid header value: {e}"),
            })?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Builds the [`Fetcher`].
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<Fetcher, RetrievalError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .default_headers(self.default_headers)
            .user_agent(concat!("merges/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(RetrievalError::Client)?;

        Ok(Fetcher {
            client,
            paths: AccessPath::ordered(&self.config.proxies),
            config: self.config,
        })
    }
}

/// Combined records from the four report batches, plus the batches that
/// could not be loaded.
#[derive(Debug)]
pub struct BatchSnapshot {
    /// Records of every loaded batch, in [`Classification`] order.
    pub records: Vec<MergeRecord>,
    pub failures: Vec<(Classification, RetrievalError)>,
}

impl BatchSnapshot {
    /// Classifications whose report loaded.
    pub fn loaded(&self) -> Vec<Classification> {
        Classification::ordered()
            .into_iter()
            .filter(|c| !self.failures.iter().any(|(failed, _)| failed == c))
            .collect()
    }

    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Extracted changelog entries for both sides of a merge. Each side
/// succeeds or fails on its own.
#[derive(Debug)]
pub struct ChangelogPair {
    pub primary: Result<ChangelogEntry, RetrievalError>,
    pub reference: Result<ChangelogEntry, RetrievalError>,
}

impl ChangelogPair {
    pub fn side(&self, side: ChangelogSide) -> &Result<ChangelogEntry, RetrievalError> {
        match side {
            ChangelogSide::Primary => &self.primary,
            ChangelogSide::Reference => &self.reference,
        }
    }
}

/// Fetches merge reports and changelogs over ordered access paths.
///
/// ## Examples
///
/// ```rust,no_run
/// use merges_lib::{Fetcher, MergesConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = Fetcher::new(MergesConfig::from_env()?)?;
/// let snapshot = fetcher.fetch_batches().await?;
///
/// for record in snapshot.records.iter().take(5) {
///     println!("{} {} -> {}", record.name, record.primary_version, record.reference_version);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Fetcher {
    client: reqwest::Client,
    config: MergesConfig,
    paths: Vec<AccessPath>,
}

impl Fetcher {
    pub fn builder(config: MergesConfig) -> FetcherBuilder {
        FetcherBuilder::new(config)
    }

    /// Creates a fetcher with the configuration's timeout and no extra headers.
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: MergesConfig) -> Result<Self, RetrievalError> {
        Self::builder(config).build()
    }

    pub fn config(&self) -> &MergesConfig {
        &self.config
    }

    pub fn access_paths(&self) -> &[AccessPath] {
        &self.paths
    }

    /// Fetches `target` as text, trying each access path in order.
    ///
    /// ## Errors
    ///
    /// Returns [`RetrievalError::Exhausted`] with every attempt's error if no
    /// path succeeds.
    pub async fn fetch_text(&self, target: &str) -> Result<String, RetrievalError> {
        self.fetch_with(target, |_, body| Ok(body)).await
    }

    /// Fetches `target` and decodes it as JSON. A body that fails to decode
    /// counts as a failed attempt.
    ///
    /// ## Errors
    ///
    /// Returns [`RetrievalError::Exhausted`] if no path yields valid JSON.
    pub async fn fetch_json(&self, target: &str) -> Result<Value, RetrievalError> {
        self.fetch_with(target, |url, body| {
            serde_json::from_str(&body).map_err(|source| RetrievalError::Decode {
                url: url.to_string(),
                source,
            })
        })
        .await
    }

    /// Fetches and normalizes the report for one classification.
    ///
    /// ## Errors
    ///
    /// Returns an error if the report cannot be retrieved over any path.
    pub async fn fetch_report(
        &self,
        classification: Classification,
    ) -> Result<Vec<MergeRecord>, RetrievalError> {
        let payload = self.fetch_json(&self.config.report_url(classification)).await?;
        Ok(normalize_with(&payload, classification, &TracingSink, Utc::now()))
    }

    /// Fetches all four reports concurrently and combines what loaded.
    ///
    /// ## Errors
    ///
    /// Returns [`RetrievalError::AllBatchesFailed`] only when no report
    /// loaded. Partial failures are listed in [`BatchSnapshot::failures`].
    pub async fn fetch_batches(&self) -> Result<BatchSnapshot, RetrievalError> {
        let (main, universe, restricted, multiverse) = tokio::join!(
            self.fetch_report(Classification::Main),
            self.fetch_report(Classification::Universe),
            self.fetch_report(Classification::Restricted),
            self.fetch_report(Classification::Multiverse),
        );

        let mut loaded = Vec::new();
        let mut failures = Vec::new();

        for (classification, result) in [
            (Classification::Main, main),
            (Classification::Universe, universe),
            (Classification::Restricted, restricted),
            (Classification::Multiverse, multiverse),
        ] {
            match result {
                Ok(records) => loaded.push((classification, records)),
                Err(e) => {
                    tracing::warn!(classification = %classification, error = %e, "report batch failed");
                    failures.push((classification, e));
                }
            }
        }

        if loaded.is_empty() {
            return Err(RetrievalError::AllBatchesFailed { failures });
        }

        let records = combine_batches(loaded);
        tracing::info!(
            records = records.len(),
            failed_batches = failures.len(),
            "merge reports loaded"
        );

        Ok(BatchSnapshot { records, failures })
    }

    /// Fetches the changelog for one side of `record` and extracts the entry
    /// for that side's version.
    ///
    /// Candidate URLs are tried in order, each over every access path. A
    /// body only counts if it passes [`looks_like_valid_content`].
    ///
    /// ## Errors
    ///
    /// Returns [`RetrievalError::ChangelogUnavailable`], carrying an
    /// external link, if no candidate yields a usable changelog.
    #[instrument(skip(self, record), fields(package = %record.name))]
    pub async fn fetch_changelog(
        &self,
        record: &MergeRecord,
        side: ChangelogSide,
    ) -> Result<ChangelogEntry, RetrievalError> {
        let version = side.version_of(record);
        let mut attempts = Vec::new();

        for candidate in changelog_candidates(record, side, &self.config) {
            let result = self
                .fetch_with(&candidate, |url, body| {
                    if looks_like_valid_content(&body) {
                        Ok(body)
                    } else {
                        Err(RetrievalError::InvalidContent {
                            url: url.to_string(),
                        })
                    }
                })
                .await;

            match result {
                Ok(body) => return Ok(ChangelogEntry::from_changelog(&body, version)),
                Err(e) => attempts.push(e),
            }
        }

        Err(RetrievalError::ChangelogUnavailable {
            package: record.name.clone(),
            side,
            link: external_link(record, side, &self.config),
            attempts,
        })
    }

    /// Fetches both changelog sides of `record` concurrently.
    pub async fn fetch_changelog_pair(&self, record: &MergeRecord) -> ChangelogPair {
        let (primary, reference) = tokio::join!(
            self.fetch_changelog(record, ChangelogSide::Primary),
            self.fetch_changelog(record, ChangelogSide::Reference),
        );
        ChangelogPair { primary, reference }
    }

    /// Tries `target` over each access path until `accept` takes a body.
    async fn fetch_with<T, F>(&self, target: &str, accept: F) -> Result<T, RetrievalError>
    where
        F: Fn(&str, String) -> Result<T, RetrievalError>,
    {
        let mut attempts = Vec::new();

        for path in &self.paths {
            let url = path.resolve(target);
            let outcome = match self.attempt(&url).await {
                Ok(body) => accept(&url, body),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(value) => return Ok(value),
                Err(e) => {
                    tracing::debug!(path = path.label(), error = %e, "access path failed");
                    attempts.push(e);
                }
            }
        }

        Err(RetrievalError::Exhausted {
            resource: target.to_string(),
            attempts,
        })
    }

    /// One GET request; non-success statuses are errors.
    #[instrument(
        name = "fetch_attempt",
        skip(self),
        fields(
            http.status_code = tracing::field::Empty,
            otel.kind = "client",
        )
    )]
    async fn attempt(&self, url: &str) -> Result<String, RetrievalError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| RetrievalError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        Span::current().record("http.status_code", status.as_u16());

        if !status.is_success() {
            return Err(RetrievalError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| RetrievalError::Http {
            url: url.to_string(),
            source,
        })
    }
}
