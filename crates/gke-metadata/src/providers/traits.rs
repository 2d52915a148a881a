//! Project resolver trait.

use async_trait::async_trait;

use crate::error::CloudError;

/// Resolves a project ID to its provider-assigned project number.
#[async_trait]
pub trait ProjectResolver: Send + Sync {
    /// Look up the project number for `project_id`.
    ///
    /// Implementations perform any client setup lazily inside this call so
    /// that setup failures are reported the same way as lookup failures.
    async fn project_number(&self, project_id: &str) -> Result<String, CloudError>;
}
