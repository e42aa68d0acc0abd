//! Typed client for GitHub Actions artifacts.
//!
//! Artifacts are resource proxies: they start out partially known (from a
//! listing, or just a URL) and complete themselves with a single GET the
//! first time an unset field is read.
//!
//! # Configuration
//!
//! - `GITHUB_TOKEN` / `GH_TOKEN` - bearer token
//! - `GITHUB_API_URL` - API base URL (defaults to `https://api.github.com`)
//! - `<config dir>/ghartifact/config.json` - persisted defaults

pub mod config;
pub mod error;
pub mod github;
pub mod resource;

pub use config::Config;
pub use error::GithubError;
pub use github::client::{ArtifactPage, GithubClient};
pub use resource::{ArchiveDownload, Artifact, Attribute};
