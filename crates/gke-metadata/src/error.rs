//! Error types.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Errors raised while loading the kubeconfig snapshot.
#[derive(Error, Debug)]
pub enum ConfigLoadError {
    /// No kubeconfig could be located.
    #[error("kubeconfig not found: {0}")]
    NotFound(String),

    /// A kubeconfig file could not be read.
    #[error("failed to read kubeconfig {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The kubeconfig could not be parsed or merged.
    #[error("invalid kubeconfig: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),
}

/// Errors that can occur while talking to Google Cloud.
#[derive(Error, Debug)]
pub enum CloudError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Resource not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Authentication or authorization failed.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// No usable ambient credentials.
    #[error("Credentials error: {0}")]
    Credentials(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Service account assertion could not be signed.
    #[error("Token signing error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

/// Failure of the one-time project number resolution.
///
/// Cheap to clone so that every caller of
/// [`Metadata::project_number`](crate::Metadata::project_number) receives the
/// same error.
#[derive(Error, Debug, Clone)]
#[error(transparent)]
pub struct ResolutionError(Arc<CloudError>);

impl From<CloudError> for ResolutionError {
    fn from(err: CloudError) -> Self {
        Self(Arc::new(err))
    }
}

impl ResolutionError {
    /// Underlying cloud error.
    #[must_use]
    pub fn cloud_error(&self) -> &CloudError {
        &self.0
    }

    /// Whether both errors originate from the same failure.
    #[must_use]
    pub fn is_same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
