//! Lazy completion shared by every resource proxy
//!
//! A [`Completable`] owns one resource's attributes and fetches the full
//! representation from its canonical URL the first time an unset attribute
//! is read. After that single fetch (or when it was built from a full
//! response) it never goes back to the network for attributes.

use crate::error::GithubError;
use crate::github::http::GithubHttpClient;
use anyhow::Result;
use serde_json::{Map, Value};

/// Attribute set of one resource type
pub trait ResourceAttributes: Default {
    /// Resource name used in logs and errors
    const KIND: &'static str;

    /// Merge every known key present in `attributes`; absent keys are left alone
    fn use_attributes(&mut self, attributes: &Map<String, Value>);

    /// Canonical API URL, once known
    fn url(&self) -> Option<&str>;

    /// Reset every attribute to `NotSet`
    fn initialize_empty(&mut self) {
        *self = Self::default();
    }
}

pub struct Completable<A> {
    http: GithubHttpClient,
    attributes: A,
    /// Where to complete from while the `url` attribute is still unknown
    location: Option<String>,
    completed: bool,
}

impl<A: ResourceAttributes> Completable<A> {
    /// Proxy that knows only where it lives
    pub fn lazy(http: GithubHttpClient, location: Option<String>) -> Self {
        let mut attributes = A::default();
        attributes.initialize_empty();
        Self {
            http,
            attributes,
            location,
            completed: false,
        }
    }

    /// Proxy hydrated from a response; `completed` marks it as a full representation
    pub fn from_response(http: GithubHttpClient, attributes: &Value, completed: bool) -> Self {
        let mut proxy = Self::lazy(http, None);
        proxy.ingest(attributes);
        proxy.completed = completed;
        proxy
    }

    pub fn http(&self) -> &GithubHttpClient {
        &self.http
    }

    pub fn attributes(&self) -> &A {
        &self.attributes
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Merge a raw JSON object; anything that is not an object is ignored
    pub fn ingest(&mut self, raw: &Value) {
        match raw.as_object() {
            Some(map) => self.attributes.use_attributes(map),
            None => tracing::debug!("Ignoring non-object {} payload", A::KIND),
        }
    }

    pub fn initialize_empty(&mut self) {
        self.attributes.initialize_empty();
    }

    /// Complete unless the attribute being read is already set
    pub async fn complete_if_not_set(&mut self, is_set: bool) -> Result<()> {
        if is_set {
            return Ok(());
        }
        self.complete_if_needed().await
    }

    /// Fetch the full representation once per object lifetime
    pub async fn complete_if_needed(&mut self) -> Result<()> {
        if self.completed {
            return Ok(());
        }

        let url = self
            .attributes
            .url()
            .or(self.location.as_deref())
            .map(str::to_string)
            .ok_or(GithubError::Incompletable { kind: A::KIND })?;

        tracing::debug!("Completing {} from {}", A::KIND, url);
        // Transport errors propagate as-is; a failed fetch leaves the object incomplete
        let data = self.http.get_json(&url).await?;

        self.ingest(&data);
        self.completed = true;
        Ok(())
    }
}
