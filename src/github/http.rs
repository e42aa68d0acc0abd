//! HTTP utilities for GitHub REST API calls

use crate::error::GithubError;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION, CONTENT_DISPOSITION};
use reqwest::{redirect, Client, Method, RequestBuilder, StatusCode};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Media type GitHub recommends for REST calls
const GITHUB_JSON: &str = "application/vnd.github+json";

/// REST API version pinned on every request
const API_VERSION: &str = "2022-11-28";

const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Raw (non-JSON) response, as returned by archive downloads
#[derive(Debug, Clone)]
pub struct BinaryResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Final URL of this response
    pub url: Url,
    pub content: Vec<u8>,
}

impl BinaryResponse {
    /// Redirect target, if this response is a `302 Found` carrying a `location` header
    ///
    /// Relative locations resolve against this response's own URL.
    pub fn found_location(&self) -> Result<Option<Url>> {
        if self.status != StatusCode::FOUND {
            return Ok(None);
        }
        let Some(location) = self
            .headers
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
        else {
            return Ok(None);
        };

        self.url
            .join(location)
            .map(Some)
            .with_context(|| format!("Invalid redirect location: {}", location))
    }

    /// Filename for the payload: `Content-Disposition` first, then the URL's last segment
    pub fn filename(&self) -> Option<String> {
        content_disposition_filename(&self.headers).or_else(|| {
            self.url
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
        })
    }
}

/// Extract `filename=` from a `Content-Disposition` header
pub fn content_disposition_filename(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(CONTENT_DISPOSITION)?.to_str().ok()?;

    value.split(';').map(str::trim).find_map(|part| {
        let (key, raw) = part.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("filename") {
            return None;
        }
        let name = raw.trim().trim_matches('"');
        (!name.is_empty()).then(|| name.to_string())
    })
}

/// HTTP client wrapper for GitHub API calls
#[derive(Clone)]
pub struct GithubHttpClient {
    client: Client,
    base_url: String,
    base: Url,
    token: Option<String>,
}

impl GithubHttpClient {
    /// Create a new HTTP client
    ///
    /// Redirects are never followed here: archive downloads answer with a
    /// `302` whose handling belongs to the resource.
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let base = Url::parse(&base_url)
            .with_context(|| format!("Invalid API base URL: {}", base_url))?;

        let client = Client::builder()
            .user_agent(concat!("ghartifact/", env!("CARGO_PKG_VERSION")))
            .redirect(redirect::Policy::none())
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url,
            base,
            token,
        })
    }

    /// API base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve `/path` against the API base; absolute URLs pass through
    pub fn absolute_url(&self, url: &str) -> Result<Url> {
        let full = if url.starts_with('/') {
            format!("{}{}", self.base_url, url)
        } else {
            url.to_string()
        };
        Url::parse(&full).with_context(|| format!("Invalid URL: {}", full))
    }

    /// Whether `url` points at the configured API host
    fn is_api_host(&self, url: &Url) -> bool {
        url.scheme() == self.base.scheme()
            && url.host_str() == self.base.host_str()
            && url.port_or_known_default() == self.base.port_or_known_default()
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        // Pre-signed storage URLs reject (and must not see) our token
        let authorize = self.is_api_host(&url);

        let mut request = self
            .client
            .request(method, url)
            .header(ACCEPT, GITHUB_JSON)
            .header(API_VERSION_HEADER, API_VERSION);

        if let (true, Some(token)) = (authorize, self.token.as_deref()) {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        request
    }

    /// Make a GET request and parse the JSON body, failing on non-2xx
    pub async fn get_json(&self, url: &str) -> Result<Value> {
        self.get_json_with_query(url, &[]).await
    }

    /// Make a GET request with query parameters
    pub async fn get_json_with_query(&self, url: &str, query: &[(&str, String)]) -> Result<Value> {
        let url = self.absolute_url(url)?;
        tracing::debug!("GET {}", url);

        let response = self
            .request(Method::GET, url.clone())
            .query(query)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(GithubError::Status {
                status,
                url: url.to_string(),
            }
            .into());
        }

        serde_json::from_str(&body).context("Failed to parse response JSON")
    }

    /// Make a request and return only its status, without checking it
    ///
    /// The body is drained and discarded.
    pub async fn request_status(&self, method: Method, url: &str) -> Result<StatusCode> {
        let url = self.absolute_url(url)?;
        tracing::debug!("{} {}", method, url);

        let response = self
            .request(method, url)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        response
            .bytes()
            .await
            .context("Failed to read response body")?;

        Ok(status)
    }

    /// Make a GET request for a binary payload, failing on status >= 400
    pub async fn request_binary(&self, url: &str) -> Result<BinaryResponse> {
        let url = self.absolute_url(url)?;
        tracing::debug!("GET (binary) {}", url);

        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().clone();

        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(GithubError::Status {
                status,
                url: url.to_string(),
            }
            .into());
        }

        let content = response
            .bytes()
            .await
            .context("Failed to read response body")?
            .to_vec();

        Ok(BinaryResponse {
            status,
            headers,
            url,
            content,
        })
    }
}

/// Format a GitHub API error for display
/// Sanitizes error messages to avoid leaking API details
pub fn format_github_error(error: &anyhow::Error) -> String {
    match error.downcast_ref::<GithubError>() {
        Some(GithubError::Status { status, .. }) => match status.as_u16() {
            401 => "Authentication failed. Set GITHUB_TOKEN or pass --token.".to_string(),
            403 => "Permission denied or rate limited. Check your token scopes.".to_string(),
            404 => "Resource not found.".to_string(),
            410 => "Resource is gone (artifact expired or deleted).".to_string(),
            422 => "Invalid request. Check your parameters.".to_string(),
            429 => "Rate limit exceeded. Please try again later.".to_string(),
            500..=599 => "GitHub is temporarily unavailable. Please try again.".to_string(),
            _ => "Request failed. Check your network connection and try again.".to_string(),
        },
        Some(other) => other.to_string(),
        None => {
            let error_str = error.to_string();
            let sanitized = error_str
                .chars()
                .filter(|c| c.is_ascii_graphic() || *c == ' ')
                .take(80)
                .collect::<String>();

            if sanitized.len() < error_str.len() {
                format!("{}...", sanitized)
            } else {
                sanitized
            }
        }
    }
}
