//! GitHub Client
//!
//! Main client for the artifacts API, combining configuration and HTTP
//! functionality and handing out resource proxies.

use super::http::GithubHttpClient;
use crate::config::Config;
use crate::resource::Artifact;
use anyhow::{Context, Result};
use serde_json::Value;
use std::time::Duration;

/// One page of a repository's artifact listing
pub struct ArtifactPage {
    pub total_count: u64,
    pub artifacts: Vec<Artifact>,
}

/// Main GitHub client
#[derive(Clone)]
pub struct GithubClient {
    pub http: GithubHttpClient,
    pub per_page: u32,
}

impl GithubClient {
    /// Create a new client from configuration
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_settings(
            &config.effective_api_url(),
            config.effective_token(),
            config.effective_timeout(),
            config.effective_per_page(),
        )
    }

    /// Create a client from explicit settings
    pub fn with_settings(
        api_url: &str,
        token: Option<String>,
        timeout: Duration,
        per_page: u32,
    ) -> Result<Self> {
        if token.is_none() {
            tracing::warn!("No GitHub token configured; only public data is reachable");
        }

        let http = GithubHttpClient::new(api_url, token, timeout)?;

        Ok(Self {
            http,
            per_page: per_page.clamp(1, 100),
        })
    }

    /// Create a client from the on-disk configuration
    pub fn from_config() -> Result<Self> {
        Self::new(&Config::load())
    }

    // =========================================================================
    // URL helpers
    // =========================================================================

    /// Build repository API URL
    pub fn repo_url(&self, owner: &str, repo: &str) -> String {
        format!(
            "{}/repos/{}/{}",
            self.http.base_url(),
            urlencoding::encode(owner),
            urlencoding::encode(repo)
        )
    }

    /// Build artifact listing URL
    pub fn artifacts_url(&self, owner: &str, repo: &str) -> String {
        format!("{}/actions/artifacts", self.repo_url(owner, repo))
    }

    /// Build single artifact URL
    pub fn artifact_url(&self, owner: &str, repo: &str, artifact_id: u64) -> String {
        format!("{}/{}", self.artifacts_url(owner, repo), artifact_id)
    }

    // =========================================================================
    // Artifacts
    // =========================================================================

    /// Artifact proxy that fetches itself on first field access
    pub fn lazy_artifact(&self, owner: &str, repo: &str, artifact_id: u64) -> Artifact {
        self.artifact_from_url(&self.artifact_url(owner, repo, artifact_id))
    }

    /// Artifact proxy for an API URL (absolute or `/repos/...`)
    pub fn artifact_from_url(&self, url: &str) -> Artifact {
        Artifact::lazy(self.http.clone(), url)
    }

    /// Fetch one artifact now
    pub async fn get_artifact(&self, owner: &str, repo: &str, artifact_id: u64) -> Result<Artifact> {
        let url = self.artifact_url(owner, repo, artifact_id);
        let data = self.http.get_json(&url).await?;
        Ok(Artifact::from_response(self.http.clone(), &data, true))
    }

    /// Fetch one page of a repository's artifacts
    ///
    /// Only the requested page is fetched; callers walk pages themselves.
    pub async fn list_artifacts(&self, owner: &str, repo: &str, page: u32) -> Result<ArtifactPage> {
        let url = self.artifacts_url(owner, repo);
        let query = [
            ("per_page", self.per_page.to_string()),
            ("page", page.max(1).to_string()),
        ];
        let response = self
            .http
            .get_json_with_query(&url, &query)
            .await
            .with_context(|| format!("Failed to list artifacts for {}/{}", owner, repo))?;

        Ok(self.artifact_page(&response))
    }

    fn artifact_page(&self, response: &Value) -> ArtifactPage {
        let artifacts: Vec<Artifact> = response
            .get("artifacts")
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .map(|item| Artifact::from_response(self.http.clone(), item, true))
                    .collect()
            })
            .unwrap_or_default();

        let total_count = response
            .get("total_count")
            .and_then(|v| v.as_u64())
            .unwrap_or(artifacts.len() as u64);

        tracing::debug!("Listed {} of {} artifacts", artifacts.len(), total_count);

        ArtifactPage {
            total_count,
            artifacts,
        }
    }
}

/// Split an `owner/repo` argument
pub fn parse_repo_slug(slug: &str) -> Result<(&str, &str)> {
    let (owner, repo) = slug
        .split_once('/')
        .with_context(|| format!("Expected OWNER/REPO, got '{}'", slug))?;

    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        anyhow::bail!("Expected OWNER/REPO, got '{}'", slug);
    }
    Ok((owner, repo))
}
