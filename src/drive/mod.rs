//! Google Drive integration module
//!
//! Covers everything that talks to Google: service-account authentication,
//! search-filter construction, and the `files.list` call itself. The rest of
//! the application only sees the `ImageLister` seam.

pub mod auth;
pub mod client;
pub mod query;

// Re-export commonly used types
pub use auth::{AuthError, ServiceAccountAuth, TokenProvider};
pub use client::{DriveClient, DriveFile};
pub use query::FileQuery;

use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by a Drive listing
#[derive(Debug, Error)]
pub enum DriveError {
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),
    #[error("request to Drive failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Drive API returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Source of image-file listings.
///
/// The request handler depends on this trait rather than on `DriveClient`,
/// so tests can substitute a canned or failing provider.
#[async_trait]
pub trait ImageLister: Send + Sync {
    /// List image files modified in `[from, to)`, newest first.
    async fn list_images(&self, from: &str, to: &str) -> Result<Vec<DriveFile>, DriveError>;
}
