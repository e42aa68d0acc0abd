//! Typed root causes carried inside `anyhow::Error`
//!
//! Callers that need to branch on a failure can
//! `err.downcast_ref::<GithubError>()`.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GithubError {
    #[error("API request failed: {status} ({url})")]
    Status { status: StatusCode, url: String },

    #[error("cannot complete {kind}: no URL is known for it")]
    Incompletable { kind: &'static str },

    #[error("{kind} has no url attribute")]
    MissingUrl { kind: &'static str },
}

impl GithubError {
    /// HTTP status behind this error, if any
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            GithubError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
