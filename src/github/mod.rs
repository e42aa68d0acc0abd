//! GitHub API interaction module
//!
//! # Module Structure
//!
//! - [`client`] - Main GitHub client: URL building and resource construction
//! - [`http`] - HTTP utilities for REST API calls
//!
//! # Example
//!
//! ```ignore
//! use ghartifact::config::Config;
//! use ghartifact::github::client::GithubClient;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = GithubClient::new(&Config::load())?;
//!     let page = client.list_artifacts("octo-org", "octo-docs", 1).await?;
//!     println!("{} artifacts", page.total_count);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod http;
