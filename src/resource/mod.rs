//! Resource proxies
//!
//! Typed, partially-populated views of remote GitHub entities that complete
//! themselves from the API on demand.
//!
//! # Architecture
//!
//! - [`attribute`] - Two-state fields (`NotSet` / `Set`) and JSON decoders
//! - [`completable`] - One-shot completion shared by every resource type
//! - [`artifact`] - GitHub Actions workflow artifacts
//!
//! # Example
//!
//! ```ignore
//! use ghartifact::github::client::GithubClient;
//!
//! async fn show(client: &GithubClient) -> anyhow::Result<()> {
//!     let mut artifact = client.lazy_artifact("octo-org", "octo-docs", 11);
//!     // First read of an unset field performs the single completion fetch
//!     println!("{:?}", artifact.name().await?);
//!     println!("{:?}", artifact.size_in_bytes().await?);
//!     Ok(())
//! }
//! ```

pub mod artifact;
pub mod attribute;
pub mod completable;

pub use artifact::{ArchiveDownload, Artifact, ArtifactAttributes, DEFAULT_ARCHIVE_FORMAT};
pub use attribute::Attribute;
pub use completable::{Completable, ResourceAttributes};
