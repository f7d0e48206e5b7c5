// src/github/client.rs
// =============================================================================
// Talks to the GitHub contents API.
//
// Three calls are all the viewer needs:
// - contents(repo, path)      GET /repos/{owner}/{repo}/contents/{path}
// - download(url)             GET <download_url>   (raw text, not JSON)
// - repository_exists(repo)   GET /repos/{owner}/{repo}
//
// They sit behind the ContentSource trait so the tree and document code can
// be tested against an in-memory repository instead of the real API.
//
// Requests are unauthenticated, so GitHub's rate limit applies. We detect it
// and log it, but we do not retry or back off.
// =============================================================================

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, instrument, warn};
use url::Url;

use super::repo::RepositoryRef;
use super::types::Contents;
use crate::error::SourceError;

/// Default GitHub API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Media type GitHub expects for the v3 REST API.
const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// GitHub rejects requests without a User-Agent.
const USER_AGENT_VALUE: &str = concat!("repodocs/", env!("CARGO_PKG_VERSION"));

/// Everything the resolvers need from a content source.
///
/// Implementations must be `Send + Sync` so one source can be shared by the
/// sidebar and the document view at the same time.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Lists a directory or returns a single file's metadata.
    /// An empty `path` means the repository root.
    async fn contents(&self, repo: &RepositoryRef, path: &str) -> Result<Contents, SourceError>;

    /// Downloads raw text from a `download_url` reported in file metadata.
    async fn download(&self, url: &str) -> Result<String, SourceError>;

    /// Whether the repository is publicly visible.
    async fn repository_exists(&self, repo: &RepositoryRef) -> Result<bool, SourceError>;
}

/// The real thing: reqwest against api.github.com (or any compatible base).
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    api_base: Url,
}

impl GitHubClient {
    /// Creates a client for `api_base` (e.g. `https://api.github.com`).
    pub fn new(api_base: &str) -> Result<Self, SourceError> {
        let api_base =
            Url::parse(api_base).map_err(|e| SourceError::InvalidUrl(format!("{api_base}: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        // We reuse this client for all requests (connection pooling)
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| SourceError::Network(e.to_string()))?;

        Ok(Self { client, api_base })
    }

    // Appends path segments to the API base. Each segment is percent-encoded
    // by the url crate, so file names with spaces survive.
    fn api_url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url, SourceError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| SourceError::InvalidUrl(self.api_base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn contents_url(&self, repo: &RepositoryRef, path: &str) -> Result<Url, SourceError> {
        let head = ["repos", repo.owner.as_str(), repo.name.as_str(), "contents"];
        let tail = path.split('/').filter(|s| !s.is_empty());
        self.api_url(head.into_iter().chain(tail))
    }

    async fn api_get(&self, url: Url) -> Result<Response, SourceError> {
        debug!(%url, "GitHub API request");
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, GITHUB_ACCEPT)
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;
        check_status(url.as_str(), response)
    }
}

#[async_trait]
impl ContentSource for GitHubClient {
    #[instrument(skip(self), fields(repo = %repo))]
    async fn contents(&self, repo: &RepositoryRef, path: &str) -> Result<Contents, SourceError> {
        let url = self.contents_url(repo, path)?;
        let response = self.api_get(url).await?;
        response
            .json::<Contents>()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))
    }

    #[instrument(skip(self))]
    async fn download(&self, url: &str) -> Result<String, SourceError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;
        let response = check_status(url, response)?;
        let text = response
            .text()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;
        debug!(bytes = text.len(), "downloaded raw content");
        Ok(text)
    }

    #[instrument(skip(self), fields(repo = %repo))]
    async fn repository_exists(&self, repo: &RepositoryRef) -> Result<bool, SourceError> {
        let url = self.api_url(["repos", repo.owner.as_str(), repo.name.as_str()])?;
        match self.api_get(url).await {
            Ok(_) => Ok(true),
            Err(SourceError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

// Sorts a response into success or one of our SourceError variants
//
// HTTP status codes:
// - 2xx: success, hand the response back
// - 404: NotFound
// - 403/429 with x-ratelimit-remaining: 0 -> RateLimited
// - anything else: Status
fn check_status(url: &str, response: Response) -> Result<Response, SourceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::NOT_FOUND {
        return Err(SourceError::NotFound(url.to_string()));
    }

    if is_rate_limited(&response) {
        warn!(%url, "GitHub API rate limit exhausted");
        return Err(SourceError::RateLimited);
    }

    Err(SourceError::Status {
        status: status.as_u16(),
        url: url.to_string(),
    })
}

fn is_rate_limited(response: &Response) -> bool {
    let status = response.status();
    if status != StatusCode::FORBIDDEN && status != StatusCode::TOO_MANY_REQUESTS {
        return false;
    }
    response
        .headers()
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim() == "0")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn repo() -> RepositoryRef {
        RepositoryRef::new("octo", "docs")
    }

    #[tokio::test]
    async fn test_directory_listing_sends_accept_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/docs/contents/guide"))
            .and(header("accept", GITHUB_ACCEPT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"name": "setup.md", "path": "guide/setup.md", "sha": "1", "size": 3,
                 "type": "file", "download_url": format!("{}/raw/setup.md", server.uri())}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = GitHubClient::new(&server.uri()).unwrap();
        let contents = client.contents(&repo(), "guide").await.unwrap();

        match contents {
            Contents::Listing(entries) => assert_eq!(entries[0].path, "guide/setup.md"),
            other => panic!("expected listing, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_root_listing_uses_bare_contents_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/docs/contents"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = GitHubClient::new(&server.uri()).unwrap();
        let contents = client.contents(&repo(), "").await.unwrap();
        assert_eq!(contents, Contents::Listing(vec![]));
    }

    #[tokio::test]
    async fn test_file_metadata_and_download() {
        let server = MockServer::start().await;
        let raw = format!("{}/raw/intro.md", server.uri());
        Mock::given(method("GET"))
            .and(path("/repos/octo/docs/contents/intro.md"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "intro.md", "path": "intro.md", "sha": "2", "size": 9,
                "type": "file", "download_url": raw
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/raw/intro.md"))
            .respond_with(ResponseTemplate::new(200).set_body_string("## Hello\n"))
            .mount(&server)
            .await;

        let client = GitHubClient::new(&server.uri()).unwrap();
        let Contents::File(meta) = client.contents(&repo(), "intro.md").await.unwrap() else {
            panic!("expected file metadata");
        };
        let url = meta.download_url.unwrap();
        assert_eq!(client.download(&url).await.unwrap(), "## Hello\n");
    }

    #[tokio::test]
    async fn test_missing_path_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
            .mount(&server)
            .await;

        let client = GitHubClient::new(&server.uri()).unwrap();
        let err = client.contents(&repo(), "nope.md").await.unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_rate_limit_is_detected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(403)
                    .insert_header("x-ratelimit-remaining", "0")
                    .set_body_json(json!({"message": "API rate limit exceeded"})),
            )
            .mount(&server)
            .await;

        let client = GitHubClient::new(&server.uri()).unwrap();
        let err = client.contents(&repo(), "").await.unwrap_err();
        assert_eq!(err, SourceError::RateLimited);
    }

    #[tokio::test]
    async fn test_plain_forbidden_is_a_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = GitHubClient::new(&server.uri()).unwrap();
        let err = client.contents(&repo(), "").await.unwrap_err();
        assert!(matches!(err, SourceError::Status { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_repository_exists() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/docs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"full_name": "octo/docs"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/private"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = GitHubClient::new(&server.uri()).unwrap();
        assert!(client.repository_exists(&repo()).await.unwrap());
        assert!(!client
            .repository_exists(&RepositoryRef::new("octo", "private"))
            .await
            .unwrap());
    }

    #[test]
    fn test_contents_url_encodes_segments() {
        let client = GitHubClient::new(DEFAULT_API_BASE).unwrap();
        let url = client.contents_url(&repo(), "guides/My Notes.md").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/octo/docs/contents/guides/My%20Notes.md"
        );
    }
}
