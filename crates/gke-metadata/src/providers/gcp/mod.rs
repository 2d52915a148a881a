//! GCP (Google Cloud Platform) provider.
//!
//! Resolves project numbers through the Cloud Resource Manager v1 API
//! (`projects.get`), authenticated with ambient credentials.
//!
//! ## Credentials
//!
//! - **`GOOGLE_OAUTH_ACCESS_TOKEN`** - bearer token used as-is
//! - **Application default credentials** - `authorized_user` or
//!   `service_account` JSON from `GOOGLE_APPLICATION_CREDENTIALS` or the
//!   gcloud well-known file
//! - **Metadata server** - when running on GCE/GKE

pub mod auth;
mod client;
mod models;

pub use auth::TokenSource;
pub use client::{ResourceManager, ResourceManagerConfig, DEFAULT_ENDPOINT, ENDPOINT_ENV};
pub use models::*;
