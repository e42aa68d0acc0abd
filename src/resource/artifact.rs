//! GitHub Actions workflow artifacts
//!
//! REST reference: <https://docs.github.com/en/rest/actions/artifacts>

use super::attribute::{
    bool_attribute, datetime_attribute, int_attribute, string_attribute, use_attribute, Attribute,
};
use super::completable::{Completable, ResourceAttributes};
use crate::error::GithubError;
use crate::github::http::GithubHttpClient;
use anyhow::Result;
use chrono::{DateTime, Utc};
use reqwest::{Method, StatusCode};
use serde_json::{Map, Value};
use std::fmt;

/// Archive format GitHub serves artifacts in
pub const DEFAULT_ARCHIVE_FORMAT: &str = "zip";

/// Field state of one artifact
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtifactAttributes {
    pub id: Attribute<i64>,
    pub node_id: Attribute<String>,
    pub name: Attribute<String>,
    pub size_in_bytes: Attribute<i64>,
    pub url: Attribute<String>,
    pub archive_download_url: Attribute<String>,
    pub expired: Attribute<bool>,
    pub created_at: Attribute<DateTime<Utc>>,
    pub updated_at: Attribute<DateTime<Utc>>,
    pub expires_at: Attribute<DateTime<Utc>>,
}

impl ResourceAttributes for ArtifactAttributes {
    const KIND: &'static str = "Artifact";

    fn use_attributes(&mut self, attributes: &Map<String, Value>) {
        use_attribute(&mut self.id, attributes, "id", int_attribute);
        use_attribute(&mut self.node_id, attributes, "node_id", string_attribute);
        use_attribute(&mut self.name, attributes, "name", string_attribute);
        use_attribute(&mut self.size_in_bytes, attributes, "size_in_bytes", int_attribute);
        use_attribute(&mut self.url, attributes, "url", string_attribute);
        use_attribute(
            &mut self.archive_download_url,
            attributes,
            "archive_download_url",
            string_attribute,
        );
        use_attribute(&mut self.expired, attributes, "expired", bool_attribute);
        use_attribute(&mut self.created_at, attributes, "created_at", datetime_attribute);
        use_attribute(&mut self.updated_at, attributes, "updated_at", datetime_attribute);
        use_attribute(&mut self.expires_at, attributes, "expires_at", datetime_attribute);
    }

    fn url(&self) -> Option<&str> {
        self.url.value().map(String::as_str)
    }
}

/// Archive payload returned by [`Artifact::download`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveDownload {
    pub filename: Option<String>,
    pub content: Vec<u8>,
}

/// A workflow artifact, completed from the API on first read of an unset field
///
/// Accessors take `&mut self` because any of them may perform the single
/// completion fetch.
pub struct Artifact {
    inner: Completable<ArtifactAttributes>,
}

impl Artifact {
    /// Artifact known only by its API URL; the first accessor call fetches it
    pub fn lazy(http: GithubHttpClient, url: impl Into<String>) -> Self {
        Self {
            inner: Completable::lazy(http, Some(url.into())),
        }
    }

    /// Artifact built from a response payload
    ///
    /// `completed` should be true when `attributes` is a full representation
    /// (single-artifact GET or a listing entry).
    pub fn from_response(http: GithubHttpClient, attributes: &Value, completed: bool) -> Self {
        Self {
            inner: Completable::from_response(http, attributes, completed),
        }
    }

    /// Current field state, without any network access
    pub fn attributes(&self) -> &ArtifactAttributes {
        self.inner.attributes()
    }

    pub fn is_completed(&self) -> bool {
        self.inner.is_completed()
    }

    /// Merge fields present in `raw` into this artifact
    pub fn ingest(&mut self, raw: &Value) {
        self.inner.ingest(raw);
    }

    pub fn initialize_empty(&mut self) {
        self.inner.initialize_empty();
    }

    /// Perform the completion fetch now if it has not happened yet
    pub async fn ensure_loaded(&mut self) -> Result<&ArtifactAttributes> {
        self.inner.complete_if_needed().await?;
        Ok(self.inner.attributes())
    }

    async fn complete_if_not_set(
        &mut self,
        is_set: fn(&ArtifactAttributes) -> bool,
    ) -> Result<&ArtifactAttributes> {
        let set = is_set(self.inner.attributes());
        self.inner.complete_if_not_set(set).await?;
        Ok(self.inner.attributes())
    }

    pub async fn id(&mut self) -> Result<Option<i64>> {
        let attrs = self.complete_if_not_set(|a| a.id.is_set()).await?;
        Ok(attrs.id.cloned())
    }

    pub async fn node_id(&mut self) -> Result<Option<&str>> {
        let attrs = self.complete_if_not_set(|a| a.node_id.is_set()).await?;
        Ok(attrs.node_id.value().map(String::as_str))
    }

    pub async fn name(&mut self) -> Result<Option<&str>> {
        let attrs = self.complete_if_not_set(|a| a.name.is_set()).await?;
        Ok(attrs.name.value().map(String::as_str))
    }

    pub async fn size_in_bytes(&mut self) -> Result<Option<i64>> {
        let attrs = self.complete_if_not_set(|a| a.size_in_bytes.is_set()).await?;
        Ok(attrs.size_in_bytes.cloned())
    }

    /// Canonical API URL of this artifact
    pub async fn url(&mut self) -> Result<Option<&str>> {
        let attrs = self.complete_if_not_set(|a| a.url.is_set()).await?;
        Ok(attrs.url.value().map(String::as_str))
    }

    pub async fn archive_download_url(&mut self) -> Result<Option<&str>> {
        let attrs = self
            .complete_if_not_set(|a| a.archive_download_url.is_set())
            .await?;
        Ok(attrs.archive_download_url.value().map(String::as_str))
    }

    pub async fn expired(&mut self) -> Result<Option<bool>> {
        let attrs = self.complete_if_not_set(|a| a.expired.is_set()).await?;
        Ok(attrs.expired.cloned())
    }

    pub async fn created_at(&mut self) -> Result<Option<DateTime<Utc>>> {
        let attrs = self.complete_if_not_set(|a| a.created_at.is_set()).await?;
        Ok(attrs.created_at.cloned())
    }

    pub async fn updated_at(&mut self) -> Result<Option<DateTime<Utc>>> {
        let attrs = self.complete_if_not_set(|a| a.updated_at.is_set()).await?;
        Ok(attrs.updated_at.cloned())
    }

    pub async fn expires_at(&mut self) -> Result<Option<DateTime<Utc>>> {
        let attrs = self.complete_if_not_set(|a| a.expires_at.is_set()).await?;
        Ok(attrs.expires_at.cloned())
    }

    async fn require_url(&mut self) -> Result<String> {
        self.url()
            .await?
            .map(str::to_string)
            .ok_or_else(|| {
                GithubError::MissingUrl {
                    kind: ArtifactAttributes::KIND,
                }
                .into()
            })
    }

    /// Download the artifact archive in the default `zip` format
    pub async fn download_zip(&mut self) -> Result<ArchiveDownload> {
        self.download(DEFAULT_ARCHIVE_FORMAT).await
    }

    /// Download the artifact archive from `<url>/<archive_format>`
    ///
    /// A `302 Found` with a `location` header is followed exactly once; any
    /// other status below 400 is returned as the payload.
    pub async fn download(&mut self, archive_format: &str) -> Result<ArchiveDownload> {
        let url = self.require_url().await?;
        let http = self.inner.http();

        let mut response = http
            .request_binary(&format!("{}/{}", url, archive_format))
            .await?;

        if let Some(location) = response.found_location()? {
            tracing::debug!("Artifact archive redirected to storage");
            response = http.request_binary(location.as_str()).await?;
        }

        Ok(ArchiveDownload {
            filename: response.filename(),
            content: response.content,
        })
    }

    /// Delete the artifact; true only when the API answers `204 No Content`
    pub async fn delete(&mut self) -> Result<bool> {
        let url = self.require_url().await?;
        let status = self
            .inner
            .http()
            .request_status(Method::DELETE, &url)
            .await?;

        if status != StatusCode::NO_CONTENT {
            tracing::warn!("Artifact delete returned {}", status);
        }
        Ok(status == StatusCode::NO_CONTENT)
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let attrs = self.attributes();
        let mut params = Vec::new();
        if let Some(id) = attrs.id.value() {
            params.push(format!("id={}", id));
        }
        if let Some(url) = attrs.url.value() {
            params.push(format!("url=\"{}\"", url));
        }
        write!(f, "{}({})", ArtifactAttributes::KIND, params.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn http() -> GithubHttpClient {
        GithubHttpClient::new("https://api.github.com", None, Duration::from_secs(5)).unwrap()
    }

    fn full_payload() -> Value {
        json!({
            "id": 11,
            "node_id": "MDg6QXJ0aWZhY3QxMQ==",
            "name": "Rails",
            "size_in_bytes": 556,
            "url": "https://api.github.com/repos/octo-org/octo-docs/actions/artifacts/11",
            "archive_download_url": "https://api.github.com/repos/octo-org/octo-docs/actions/artifacts/11/zip",
            "expired": false,
            "created_at": "2020-01-10T14:59:22Z",
            "updated_at": "2020-01-21T14:59:22Z",
            "expires_at": "2020-03-21T14:59:22Z",
            "workflow_run": { "id": 2332938 }
        })
    }

    #[test]
    fn test_full_payload_sets_every_field() {
        let artifact = Artifact::from_response(http(), &full_payload(), true);
        let attrs = artifact.attributes();

        assert_eq!(attrs.id.cloned(), Some(11));
        assert_eq!(attrs.node_id.value().map(String::as_str), Some("MDg6QXJ0aWZhY3QxMQ=="));
        assert_eq!(attrs.name.value().map(String::as_str), Some("Rails"));
        assert_eq!(attrs.size_in_bytes.cloned(), Some(556));
        assert_eq!(attrs.expired.cloned(), Some(false));
        assert!(attrs.archive_download_url.is_set());
        assert!(attrs.created_at.is_set());
        assert!(attrs.updated_at.is_set());
        assert!(attrs.expires_at.is_set());
        assert!(artifact.is_completed());
    }

    #[test]
    fn test_partial_ingest_keeps_earlier_fields() {
        let mut artifact = Artifact::from_response(http(), &json!({ "id": 5 }), false);
        artifact.ingest(&json!({ "name": "x" }));

        let attrs = artifact.attributes();
        assert_eq!(attrs.id.cloned(), Some(5));
        assert_eq!(attrs.name.value().map(String::as_str), Some("x"));
        assert!(!attrs.url.is_set());
        assert!(!artifact.is_completed());
    }

    #[test]
    fn test_initialize_empty_resets_fields() {
        let mut artifact = Artifact::from_response(http(), &full_payload(), true);
        artifact.initialize_empty();
        assert_eq!(artifact.attributes(), &ArtifactAttributes::default());
    }

    #[test]
    fn test_non_object_payload_is_ignored() {
        let mut artifact = Artifact::from_response(http(), &json!({ "id": 5 }), false);
        artifact.ingest(&json!([1, 2, 3]));
        assert_eq!(artifact.attributes().id.cloned(), Some(5));
    }

    #[test]
    fn test_display_uses_identity_fields() {
        let artifact = Artifact::from_response(http(), &full_payload(), true);
        assert_eq!(
            artifact.to_string(),
            "Artifact(id=11, url=\"https://api.github.com/repos/octo-org/octo-docs/actions/artifacts/11\")"
        );

        let lazy = Artifact::lazy(http(), "https://api.github.com/repos/o/r/actions/artifacts/1");
        assert_eq!(lazy.to_string(), "Artifact()");
    }

    #[tokio::test]
    async fn test_completed_artifact_reads_without_network() {
        let mut artifact = Artifact::from_response(http(), &json!({ "id": 3 }), true);
        assert_eq!(artifact.id().await.unwrap(), Some(3));
        // Absent from a complete representation: no fetch, just None
        assert_eq!(artifact.name().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_completion_without_url_fails() {
        let mut artifact = Artifact::from_response(http(), &json!({ "id": 3 }), false);
        let err = artifact.name().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GithubError>(),
            Some(GithubError::Incompletable { kind: "Artifact" })
        ));
    }
}
