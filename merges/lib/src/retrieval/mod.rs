//! Retrieval of merge reports and changelogs.
//!
//! Every resource is fetched through an ordered list of [`AccessPath`]s.
//! Any failure on one path (network error, non-success status, undecodable
//! or invalid body) moves on to the next; only when every path fails does
//! the caller see an error.
//!
//! Report batches and changelog sides fan out concurrently and fail
//! independently: one failed batch never hides the others.

mod access;
mod error;
mod fetcher;

pub use access::AccessPath;
pub use error::RetrievalError;
pub use fetcher::{BatchSnapshot, ChangelogPair, Fetcher, FetcherBuilder};
