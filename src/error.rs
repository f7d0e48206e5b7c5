// src/error.rs
// =============================================================================
// Error types shared across the viewer.
//
// There are two layers:
// - SourceError: what went wrong talking to GitHub (HTTP status, network,
//   bad JSON). Only the github module produces these.
// - ResolveError: what the tree and document resolvers report. Every
//   SourceError is converted into one of four kinds before it leaves a
//   resolver, so the printing code only ever has to handle these four.
//
// main.rs still uses anyhow for everything that is not a resolution failure
// (bad settings file, broken config, ...).
// =============================================================================

use serde::Serialize;
use thiserror::Error;

/// Failures from the content source (GitHub contents API or a raw download).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// The API answered 404 for this path.
    #[error("not found: {0}")]
    NotFound(String),

    /// GitHub refused the request because the unauthenticated quota ran out.
    #[error("GitHub API rate limit exceeded")]
    RateLimited,

    /// Any other non-success HTTP status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// The request never got a response (DNS, TLS, connection reset, ...).
    #[error("network error: {0}")]
    Network(String),

    /// The response body was not the JSON shape we expected.
    #[error("could not decode response: {0}")]
    Decode(String),

    /// We could not even build a URL for the request.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

/// The four ways a tree listing or document resolution can fail.
///
/// Each variant carries the human-readable message shown to the user.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum ResolveError {
    /// The path or slug does not exist in the repository.
    #[error("{0}")]
    NotFound(String),

    /// The path exists but is not a downloadable file.
    #[error("{0}")]
    InvalidTarget(String),

    /// Metadata was fine but the raw text download failed.
    #[error("{0}")]
    DownloadFailed(String),

    /// Listing or metadata request failed for any other reason.
    #[error("{0}")]
    FetchFailed(String),
}

impl ResolveError {
    /// Short label used when printing, so "not found" and "network trouble"
    /// always look different on screen.
    pub fn label(&self) -> &'static str {
        match self {
            ResolveError::NotFound(_) => "not found",
            ResolveError::InvalidTarget(_) => "invalid target",
            ResolveError::DownloadFailed(_) => "download failed",
            ResolveError::FetchFailed(_) => "fetch failed",
        }
    }

    // Converts a failed listing/metadata call. A 404 becomes NotFound with
    // the caller's message; everything else is a FetchFailed.
    pub(crate) fn from_source(err: SourceError, not_found_message: &str) -> Self {
        match err {
            SourceError::NotFound(_) => ResolveError::NotFound(not_found_message.to_string()),
            SourceError::RateLimited => ResolveError::FetchFailed(
                "GitHub API rate limit exceeded, try again later.".to_string(),
            ),
            other => ResolveError::FetchFailed(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_keeps_caller_message() {
        let err = ResolveError::from_source(
            SourceError::NotFound("docs/x.md".to_string()),
            "File not found in repository.",
        );
        assert_eq!(
            err,
            ResolveError::NotFound("File not found in repository.".to_string())
        );
    }

    #[test]
    fn test_rate_limit_is_a_fetch_failure() {
        let err = ResolveError::from_source(SourceError::RateLimited, "unused");
        assert_eq!(err.label(), "fetch failed");
        assert!(err.to_string().contains("rate limit"));
    }

    #[test]
    fn test_status_is_a_fetch_failure() {
        let err = ResolveError::from_source(
            SourceError::Status {
                status: 500,
                url: "https://api.github.com/x".to_string(),
            },
            "unused",
        );
        assert!(matches!(err, ResolveError::FetchFailed(_)));
    }

    #[test]
    fn test_serializes_with_kind_tag() {
        let json = serde_json::to_value(ResolveError::NotFound("gone".to_string())).unwrap();
        assert_eq!(json["kind"], "not_found");
        assert_eq!(json["message"], "gone");
    }
}
