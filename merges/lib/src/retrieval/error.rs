//! Error types for report and changelog retrieval.

use thiserror::Error;

use crate::changelog::ChangelogSide;
use crate::types::Classification;

/// Errors raised while retrieving reports or changelogs.
///
/// Single-attempt variants describe why one URL over one access path failed.
/// Aggregate variants are returned once every alternative has been tried.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("invalid default header: {message}")]
    InvalidHeader { message: String },

    /// The request could not be sent or the body could not be read.
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// The body was not valid JSON.
    #[error("failed to decode JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The body was an error page or too short to be real content.
    #[error("{url} returned an error page instead of content")]
    InvalidContent { url: String },

    /// Every access path failed for one resource.
    #[error("all {} access paths failed for {resource}", .attempts.len())]
    Exhausted {
        resource: String,
        attempts: Vec<RetrievalError>,
    },

    /// All four merge reports failed; nothing can be shown.
    #[error("no merge report could be loaded ({} failures)", .failures.len())]
    AllBatchesFailed {
        failures: Vec<(Classification, RetrievalError)>,
    },

    /// No candidate URL produced a usable changelog.
    #[error("no {side} changelog available for {package}, see {link}")]
    ChangelogUnavailable {
        package: String,
        side: ChangelogSide,
        /// Where the package can be viewed instead.
        link: String,
        attempts: Vec<RetrievalError>,
    },
}

impl RetrievalError {
    /// Deep link to show in place of an unavailable changelog.
    pub fn external_link(&self) -> Option<&str> {
        match self {
            Self::ChangelogUnavailable { link, .. } => Some(link.as_str()),
            _ => None,
        }
    }

    /// Number of individual attempts folded into this error.
    pub fn attempt_count(&self) -> usize {
        match self {
            Self::Exhausted { attempts, .. } | Self::ChangelogUnavailable { attempts, .. } => {
                attempts.iter().map(Self::attempt_count).sum()
            }
            Self::AllBatchesFailed { failures } => {
                failures.iter().map(|(_, e)| e.attempt_count()).sum()
            }
            _ => 1,
        }
    }
}
